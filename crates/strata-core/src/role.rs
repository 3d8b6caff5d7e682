//! Semantic roles for image layers.

/// Semantic description of how layer samples should be interpreted.
///
/// An image can carry many kinds of data besides color - mattes, depth,
/// motion vectors, surface positions - and `Role` records which kind a
/// layer holds. The role guides codecs, display, and default-parameter
/// inference (e.g. "use the first luminance layer"); it never drives
/// behavioral dispatch inside operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    /// General purpose catch-all for layers with no specific role.
    #[default]
    None,
    /// Red-green-blue color.
    Rgb,
    /// Red-green color pair.
    RedGreen,
    /// Green-blue color pair.
    GreenBlue,
    /// Red-blue color pair.
    RedBlue,
    /// Red color only.
    Red,
    /// Green color only.
    Green,
    /// Blue color only.
    Blue,
    /// Alpha (opacity).
    Alpha,
    /// Matte (selection / mask).
    Matte,
    /// Luminance (intensity).
    Luminance,
    /// Depth (distance from viewer).
    Depth,
    /// Surface normal vector.
    Normal,
    /// Texture coordinate.
    Uv,
    /// Motion vector.
    Velocity,
    /// World-space position.
    Position,
}

impl Role {
    /// Returns the channel count this role implies, if any.
    ///
    /// Roles such as [`Role::None`] place no constraint and return `None`.
    pub fn depth(&self) -> Option<usize> {
        match self {
            Role::Rgb | Role::Normal | Role::Velocity | Role::Position => Some(3),
            Role::RedGreen | Role::GreenBlue | Role::RedBlue | Role::Uv => Some(2),
            Role::Red
            | Role::Green
            | Role::Blue
            | Role::Alpha
            | Role::Matte
            | Role::Luminance
            | Role::Depth => Some(1),
            Role::None => None,
        }
    }

    /// Conventional component names for codecs that name individual
    /// channels (e.g. OpenEXR).
    ///
    /// `channels` is the actual channel count of the layer, used for roles
    /// without an implied depth.
    pub fn components(&self, channels: usize) -> Vec<String> {
        let named: &[&str] = match self {
            Role::Rgb => &["R", "G", "B"],
            Role::RedGreen => &["R", "G"],
            Role::GreenBlue => &["G", "B"],
            Role::RedBlue => &["R", "B"],
            Role::Red => &["R"],
            Role::Green => &["G"],
            Role::Blue => &["B"],
            Role::Alpha => &["A"],
            Role::Matte => &["M"],
            Role::Luminance => &["Y"],
            Role::Depth => &["Z"],
            Role::Normal => &["X", "Y", "Z"],
            Role::Uv => &["U", "V"],
            Role::Velocity => &["X", "Y", "Z"],
            Role::Position => &["X", "Y", "Z"],
            Role::None => return (0..channels).map(|i| i.to_string()).collect(),
        };
        named.iter().map(|c| c.to_string()).collect()
    }

    /// Returns `true` for roles holding displayable color information.
    pub fn is_color(&self) -> bool {
        matches!(
            self,
            Role::Rgb
                | Role::RedGreen
                | Role::GreenBlue
                | Role::RedBlue
                | Role::Red
                | Role::Green
                | Role::Blue
        )
    }
}
