use dungeon_crawler::config::{PROJECTILE_LIFETIME, ROOM_HEIGHT, ROOM_WIDTH};
use dungeon_crawler::enemy::EnemyContext;
use dungeon_crawler::entities::*;
use dungeon_crawler::geometry::{Direction, Rect, RoomLayout};

use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn room() -> RoomLayout {
    RoomLayout::new(ROOM_WIDTH, ROOM_HEIGHT)
}

fn ctx<'a>(layout: &'a RoomLayout, player: (i32, i32), now_ms: u64) -> EnemyContext<'a> {
    EnemyContext {
        player,
        player_velocity: None,
        layout,
        now_ms,
        dt_ms: 16.0,
    }
}

fn tiers(enemies: &[Enemy]) -> Vec<Option<BossTier>> {
    enemies.iter().map(Enemy::boss_tier).collect()
}

// ── Boss splitting ────────────────────────────────────────────────────────────

#[test]
fn large_boss_splits_once_per_threshold() {
    let mut rng = seeded_rng();
    let mut boss = Enemy::boss(BossTier::Large, 400, 300, &mut rng);

    let children = boss.take_damage(10, &mut rng);
    assert_eq!(tiers(&children), vec![Some(BossTier::Medium); 2]);

    // Still below one half, no second split for the same threshold.
    assert!(boss.take_damage(1, &mut rng).is_empty());

    let children = boss.take_damage(5, &mut rng);
    assert_eq!(children.len(), 2);
    assert!(boss.alive);
    assert_eq!(boss.hp, 4);
}

#[test]
fn one_big_hit_crosses_every_threshold() {
    let mut rng = seeded_rng();
    let mut boss = Enemy::boss(BossTier::Large, 400, 300, &mut rng);
    let children = boss.take_damage(15, &mut rng);
    assert_eq!(children.len(), 4);
    assert!(boss.alive);
}

#[test]
fn dying_boss_leaves_a_final_split_on_the_spot() {
    let mut rng = seeded_rng();
    let mut boss = Enemy::boss(BossTier::Medium, 300, 200, &mut rng);
    boss.hp = 1;
    let children = boss.take_damage(1, &mut rng);
    assert!(!boss.alive);
    assert_eq!(tiers(&children), vec![Some(BossTier::Small); 3]);
    for child in &children {
        assert_eq!(child.body.center(), (300, 200));
        assert_eq!(child.hp, BossTier::Small.max_hp());
    }
}

#[test]
fn smallest_boss_just_dies() {
    let mut rng = seeded_rng();
    let mut boss = Enemy::boss(BossTier::Small, 300, 200, &mut rng);
    assert!(boss.take_damage(2, &mut rng).is_empty());
    assert!(boss.alive);
    assert!(boss.take_damage(10, &mut rng).is_empty());
    assert!(!boss.alive);
}

#[test]
fn tier_table() {
    assert_eq!(BossTier::Large.size(), 150);
    assert_eq!(BossTier::Medium.size(), 112);
    assert_eq!(BossTier::Small.size(), 75);
    assert_eq!(BossTier::Large.next(), Some(BossTier::Medium));
    assert_eq!(BossTier::Small.next(), None);
    assert!(BossTier::Small.thresholds().is_empty());
}

#[test]
fn every_enemy_hits_for_one() {
    let mut rng = seeded_rng();
    assert_eq!(Enemy::boss(BossTier::Large, 0, 0, &mut rng).contact_damage(), 1);
    assert_eq!(Enemy::boss(BossTier::Small, 0, 0, &mut rng).contact_damage(), 1);
    assert_eq!(Enemy::walker(0, 0).contact_damage(), 1);
}

#[test]
fn boss_never_leaves_the_room() {
    let mut rng = seeded_rng();
    let layout = room();
    let mut cues = Vec::new();
    for tier in [BossTier::Large, BossTier::Medium, BossTier::Small] {
        let mut boss = Enemy::boss(tier, 400, 300, &mut rng);
        for tick in 0..3000u64 {
            boss.update(&ctx(&layout, (100, 100), tick * 4), &mut rng, &mut cues);
            let rect = boss.rect();
            assert!(rect.left() >= 20 && rect.right() <= ROOM_WIDTH - 20, "{tier:?} {rect:?}");
            assert!(rect.top() >= 20 && rect.bottom() <= ROOM_HEIGHT - 20, "{tier:?} {rect:?}");
        }
    }
}

#[test]
fn boss_hurts_through_its_hitbox() {
    let mut rng = seeded_rng();
    let mut boss = Enemy::boss(BossTier::Large, 400, 300, &mut rng);
    // Inside the sprite but outside the 80% hitbox.
    assert!(!boss.check_hit_player(&Rect::new(326, 226, 10, 10)));
    assert!(boss.check_hit_player(&Rect::new(395, 295, 10, 10)));
}

// ── Walkers & shooters ────────────────────────────────────────────────────────

#[test]
fn walker_homes_in_on_the_player() {
    let mut rng = seeded_rng();
    let layout = room();
    let mut cues = Vec::new();
    let mut walker = Enemy::walker(300, 300);
    for _ in 0..10 {
        walker.update(&ctx(&layout, (600, 300), 0), &mut rng, &mut cues);
    }
    let (x, y) = walker.body.center();
    assert!(x > 300 && x <= 312, "x = {x}");
    assert_eq!(y, 300);
    assert!(cues.is_empty());
}

#[test]
fn walker_animation_cycles() {
    let mut rng = seeded_rng();
    let layout = room();
    let mut walker = Enemy::walker(300, 300);
    let mut context = ctx(&layout, (300, 300), 0);
    context.dt_ms = 250.0;
    walker.update(&context, &mut rng, &mut Vec::new());
    assert_eq!(walker.animation.frame, 2);
}

#[test]
fn walker_dies_at_zero_hp() {
    let mut rng = seeded_rng();
    let mut walker = Enemy::walker(300, 300);
    assert!(walker.take_damage(5, &mut rng).is_empty());
    assert!(walker.alive);
    walker.take_damage(1, &mut rng);
    assert!(!walker.alive);
    assert!(!walker.check_hit_player(&walker.rect()));
}

#[test]
fn shooter_fires_on_its_interval() {
    let mut rng = seeded_rng();
    let layout = room();
    let mut cues = Vec::new();
    let mut shooter = Enemy::shooter(200, 300);

    shooter.update(&ctx(&layout, (600, 300), 1000), &mut rng, &mut cues);
    assert!(cues.is_empty());

    shooter.update(&ctx(&layout, (600, 300), 1204), &mut rng, &mut cues);
    assert_eq!(cues, vec![Cue::Shoot]);

    shooter.update(&ctx(&layout, (600, 300), 1300), &mut rng, &mut cues);
    assert_eq!(cues.len(), 1);

    let EnemyKind::Shooter(state) = &shooter.kind else {
        panic!("not a shooter");
    };
    assert_eq!(state.projectiles.len(), 1);
    assert_eq!(state.last_shot_ms, 1204);
    // Shooters stand still.
    assert_eq!(shooter.body.center(), (200, 300));
}

#[test]
fn shooter_leads_a_moving_target() {
    let mut rng = seeded_rng();
    let layout = room();
    let mut shooter = Enemy::shooter(200, 300);
    let mut context = ctx(&layout, (400, 300), 2000);
    context.player_velocity = Some((0.0, 5.0));
    shooter.update(&context, &mut rng, &mut Vec::new());

    let EnemyKind::Shooter(state) = &shooter.kind else {
        panic!("not a shooter");
    };
    match state.projectiles[0].heading {
        Heading::Vector(x, y) => {
            assert!(x > 0.0);
            assert!(y > 0.0);
        }
        other => panic!("unexpected heading {other:?}"),
    }
}

#[test]
fn shooter_hit_uses_up_the_projectile() {
    let mut shooter = Enemy::shooter(200, 300);
    let player = Rect::new(500, 300, 50, 50);
    if let EnemyKind::Shooter(state) = &mut shooter.kind {
        state.projectiles.push(Projectile::homing(520, 320, 1.0, 0.0));
    }
    // Touching the shooter itself does nothing.
    assert!(!shooter.check_hit_player(&shooter.rect()));
    assert!(shooter.check_hit_player(&player));
    assert!(!shooter.check_hit_player(&player));
}

// ── Projectiles ───────────────────────────────────────────────────────────────

#[test]
fn projectile_lives_exactly_its_lifetime() {
    let mut shot = Projectile::cardinal(400, 300, Direction::Right);
    let mut cues = Vec::new();
    for _ in 1..PROJECTILE_LIFETIME {
        assert!(!shot.update(None, &mut cues));
    }
    assert!(shot.update(None, &mut cues));
    assert!(cues.is_empty());
}

#[test]
fn projectile_stops_at_a_wall() {
    let layout = room();
    let mut shot = Projectile::cardinal(400, 80, Direction::Up);
    let mut cues = Vec::new();
    let mut ticks = 0;
    while !shot.update(Some(&layout), &mut cues) {
        ticks += 1;
        assert!(ticks < 20, "projectile passed through the wall");
    }
    assert_eq!(cues, vec![Cue::Hit]);
}

#[test]
fn cardinal_projectile_moves_two_pixels_a_tick() {
    let mut shot = Projectile::cardinal(400, 300, Direction::Left);
    for _ in 0..10 {
        shot.update(None, &mut Vec::new());
    }
    assert_eq!(shot.body.center(), (380, 300));
}

// ── Items ─────────────────────────────────────────────────────────────────────

#[test]
fn item_effects() {
    assert_eq!(ItemKind::HealthUp.effect().hp, 3);
    assert_eq!(ItemKind::SpeedUp.effect().speed, 1.0);
    assert_eq!(ItemKind::DamageUp.effect().damage, 1);
    let upgrade = ItemKind::Upgrade.effect();
    assert!(upgrade.upgrade && upgrade.hp == 3 && upgrade.damage == 1);
    assert!(ItemKind::Trophy.effect().win);
    assert!(!ItemKind::Upgrade.effect().win);
}

#[test]
fn item_is_collected_once() {
    let mut item = Item::new(ItemKind::DamageUp, 100, 100);
    assert_eq!(item.rect, Rect::new(100, 100, ITEM_SIZE, ITEM_SIZE));
    assert!(item.touch(&Rect::new(0, 0, 50, 50)).is_none());
    assert!(item.touch(&Rect::new(120, 120, 50, 50)).is_some());
    assert!(item.touch(&Rect::new(120, 120, 50, 50)).is_none());
    assert!(item.collected);
}
