use serde::{Deserialize, Serialize};

/// Monitor-space rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn left(&self) -> i64 {
        i64::from(self.x)
    }

    /// Exclusive right edge, widened to i64
    pub fn right(&self) -> i64 {
        i64::from(self.x) + i64::from(self.width)
    }

    pub fn top(&self) -> i64 {
        i64::from(self.y)
    }

    pub fn bottom(&self) -> i64 {
        i64::from(self.y) + i64::from(self.height)
    }

    /// Whether two rectangles share any area
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges() {
        let r = Rect::new(1920, 0, 2560, 1440);
        assert_eq!(r.left(), 1920);
        assert_eq!(r.right(), 4480);
        assert_eq!(r.top(), 0);
        assert_eq!(r.bottom(), 1440);
    }

    #[test]
    fn test_side_by_side_monitors_do_not_overlap() {
        let a = Rect::new(0, 0, 1920, 1080);
        let b = Rect::new(1920, 0, 1920, 1080);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&Rect::new(1000, 500, 1920, 1080)));
    }

    #[test]
    fn test_edges_near_i32_max() {
        let far = Rect::new(i32::MAX - 10, i32::MAX - 10, u32::MAX, 1080);
        assert_eq!(far.right(), i64::from(i32::MAX) - 10 + i64::from(u32::MAX));
        assert!(!Rect::new(0, 0, 1920, 1080).overlaps(&far));
        assert!(far.overlaps(&Rect::new(i32::MAX, i32::MAX, 1, 1)));
    }
}
