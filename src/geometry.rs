/// Rectangles, directions, sub-pixel bodies and the fixed wall/door layout
/// of a room.

use crate::config::{DOOR_INSET, DOOR_SIZE, WALL_THICKNESS};

// ── Direction ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Grid step for this direction; `y` grows downward.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Direction pointing along the dominant axis of `(dx, dy)`; ties go
    /// vertical.
    pub fn from_offset(dx: i32, dy: i32) -> Direction {
        if dx.abs() > dy.abs() {
            if dx > 0 {
                Direction::Right
            } else {
                Direction::Left
            }
        } else if dy > 0 {
            Direction::Down
        } else {
            Direction::Up
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }
}

// ── Rect ──────────────────────────────────────────────────────────────────────

/// Axis-aligned integer rectangle; `x`/`y` is the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Rect {
        Rect { x, y, w, h }
    }

    pub fn from_center(cx: i32, cy: i32, w: i32, h: i32) -> Rect {
        Rect { x: cx - w / 2, y: cy - h / 2, w, h }
    }

    pub fn left(&self) -> i32 {
        self.x
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn top(&self) -> i32 {
        self.y
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub fn center(&self) -> (i32, i32) {
        (self.x + self.w / 2, self.y + self.h / 2)
    }

    pub fn set_center(&mut self, cx: i32, cy: i32) {
        self.x = cx - self.w / 2;
        self.y = cy - self.h / 2;
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Rect {
        Rect { x: self.x + dx, y: self.y + dy, ..*self }
    }

    /// Strict overlap: rectangles that only share an edge do not intersect,
    /// and empty rectangles intersect nothing.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.w > 0
            && self.h > 0
            && other.w > 0
            && other.h > 0
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Grow by `dw`/`dh` in total, keeping the centre fixed.
    pub fn inflate(&self, dw: i32, dh: i32) -> Rect {
        Rect {
            x: self.x - dw / 2,
            y: self.y - dh / 2,
            w: self.w + dw,
            h: self.h + dh,
        }
    }

    /// Move (without resizing) so the rect lies inside `outer`.  A rect larger
    /// than `outer` is centred on that axis.
    pub fn clamp_within(&self, outer: &Rect) -> Rect {
        let clamp_axis = |pos: i32, len: i32, lo: i32, outer_len: i32| {
            if len >= outer_len {
                lo + outer_len / 2 - len / 2
            } else {
                pos.clamp(lo, lo + outer_len - len)
            }
        };
        Rect {
            x: clamp_axis(self.x, self.w, outer.x, outer.w),
            y: clamp_axis(self.y, self.h, outer.y, outer.h),
            ..*self
        }
    }
}

/// Unit vector from `from` toward `to`.  The distance is floored at 1 so
/// coincident points yield a short (or zero) vector instead of NaN.
pub fn heading(from: (f32, f32), to: (f32, f32)) -> (f32, f32) {
    let dx = to.0 - from.0;
    let dy = to.1 - from.1;
    let dist = (dx * dx + dy * dy).sqrt().max(1.0);
    (dx / dist, dy / dist)
}

// ── Body ──────────────────────────────────────────────────────────────────────

/// A rectangle that moves by fractional amounts.  Whole pixels go into the
/// rect; the leftover fraction is carried to the next move so slow movers
/// still cover the right distance over time.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Body {
    pub rect: Rect,
    remainder: (f32, f32),
}

impl Body {
    pub fn new(rect: Rect) -> Body {
        Body { rect, remainder: (0.0, 0.0) }
    }

    pub fn centered(cx: i32, cy: i32, w: i32, h: i32) -> Body {
        Body::new(Rect::from_center(cx, cy, w, h))
    }

    pub fn center(&self) -> (i32, i32) {
        self.rect.center()
    }

    pub fn center_f32(&self) -> (f32, f32) {
        let (cx, cy) = self.rect.center();
        (cx as f32, cy as f32)
    }

    /// Where the rect would land after `shift(dx, dy)`, without moving.
    pub fn peek(&self, dx: f32, dy: f32) -> Rect {
        let mx = dx + self.remainder.0;
        let my = dy + self.remainder.1;
        self.rect.offset(mx.trunc() as i32, my.trunc() as i32)
    }

    pub fn shift(&mut self, dx: f32, dy: f32) {
        let mx = dx + self.remainder.0;
        let my = dy + self.remainder.1;
        self.rect.x += mx.trunc() as i32;
        self.rect.y += my.trunc() as i32;
        self.remainder = (mx.fract(), my.fract());
    }

    /// Place the rect directly, dropping any carried fraction.
    pub fn place(&mut self, rect: Rect) {
        self.rect = rect;
        self.remainder = (0.0, 0.0);
    }

    pub fn clear_remainder_x(&mut self) {
        self.remainder.0 = 0.0;
    }

    pub fn clear_remainder_y(&mut self) {
        self.remainder.1 = 0.0;
    }
}

// ── Room layout ───────────────────────────────────────────────────────────────

/// Walls and doors of one room, in room-local pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct RoomLayout {
    pub width: i32,
    pub height: i32,
    pub walls: [Rect; 4],
    doors: Vec<(Direction, Rect)>,
}

impl RoomLayout {
    pub fn new(width: i32, height: i32) -> RoomLayout {
        let t = WALL_THICKNESS;
        RoomLayout {
            width,
            height,
            walls: [
                Rect::new(0, 0, width, t),
                Rect::new(0, height - t, width, t),
                Rect::new(0, 0, t, height),
                Rect::new(width - t, 0, t, height),
            ],
            doors: Vec::new(),
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    pub fn center(&self) -> (i32, i32) {
        (self.width / 2, self.height / 2)
    }

    /// Add the door for `direction`; a room has at most one door per side.
    pub fn add_door(&mut self, direction: Direction) {
        if self.door(direction).is_none() {
            self.doors
                .push((direction, door_rect(direction, self.width, self.height)));
        }
    }

    pub fn door(&self, direction: Direction) -> Option<Rect> {
        self.doors
            .iter()
            .find(|(d, _)| *d == direction)
            .map(|(_, r)| *r)
    }

    pub fn doors(&self) -> &[(Direction, Rect)] {
        &self.doors
    }

    pub fn check_collision(&self, rect: &Rect) -> bool {
        self.walls.iter().any(|wall| rect.intersects(wall))
    }
}

/// Door rectangle for `direction`, centred on its wall.
pub fn door_rect(direction: Direction, width: i32, height: i32) -> Rect {
    let t = WALL_THICKNESS;
    match direction {
        Direction::Up => Rect::new(width / 2 - DOOR_SIZE / 2, DOOR_INSET, DOOR_SIZE, t),
        Direction::Down => Rect::new(
            width / 2 - DOOR_SIZE / 2,
            height - t - DOOR_INSET,
            DOOR_SIZE,
            t,
        ),
        Direction::Left => Rect::new(DOOR_INSET, height / 2 - DOOR_SIZE / 2, t, DOOR_SIZE),
        Direction::Right => Rect::new(
            width - t - DOOR_INSET,
            height / 2 - DOOR_SIZE / 2,
            t,
            DOOR_SIZE,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_rects_do_not_intersect() {
        let a = Rect::new(0, 0, 10, 10);
        assert!(!a.intersects(&Rect::new(10, 0, 10, 10)));
        assert!(a.intersects(&Rect::new(9, 9, 10, 10)));
        assert!(!a.intersects(&Rect::new(5, 5, 0, 0)));
    }

    #[test]
    fn body_carries_fraction_between_moves() {
        let mut body = Body::new(Rect::new(0, 0, 10, 10));
        for _ in 0..4 {
            body.shift(0.25, -0.5);
        }
        assert_eq!(body.rect.x, 1);
        assert_eq!(body.rect.y, -2);
    }

    #[test]
    fn heading_floors_distance() {
        let (x, y) = heading((5.0, 5.0), (5.0, 5.0));
        assert_eq!((x, y), (0.0, 0.0));
        let (x, _) = heading((0.0, 0.0), (0.5, 0.0));
        assert!((x - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn doors_sit_inside_their_wall() {
        let layout = RoomLayout::new(800, 600);
        for dir in Direction::ALL {
            let door = door_rect(dir, 800, 600);
            assert!(layout.check_collision(&door), "{dir:?} door off the wall");
        }
    }
}
