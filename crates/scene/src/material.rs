use cottage_assets::TextureId;
use cottage_common::Color;

/// Physically-inspired surface description.
///
/// `map` is multiplied into `color`; a missing or unresolved map leaves the
/// surface untextured. `displacement_map` offsets vertices along their normal
/// by `texel * displacement_scale`.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub color: Color,
    pub map: Option<TextureId>,
    pub roughness: f32,
    pub metalness: f32,
    pub transparent: bool,
    pub opacity: f32,
    pub displacement_map: Option<TextureId>,
    pub displacement_scale: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            map: None,
            roughness: 1.0,
            metalness: 0.0,
            transparent: false,
            opacity: 1.0,
            displacement_map: None,
            displacement_scale: 1.0,
        }
    }
}

impl Material {
    pub fn colored(hex: u32) -> Self {
        Self {
            color: Color::from_hex(hex),
            ..Self::default()
        }
    }

    /// Texture handles this material samples, in binding order.
    pub fn textures(&self) -> impl Iterator<Item = TextureId> + '_ {
        self.map.iter().chain(self.displacement_map.iter()).copied()
    }

    /// Blended surfaces are drawn after opaque ones without depth writes.
    pub fn is_blended(&self) -> bool {
        self.transparent && self.opacity < 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_opaque_white() {
        let m = Material::default();
        assert_eq!(m.color, Color::WHITE);
        assert!(!m.is_blended());
        assert_eq!(m.textures().count(), 0);
    }

    #[test]
    fn transparent_glass_blends() {
        let glass = Material {
            transparent: true,
            opacity: 0.7,
            ..Material::colored(0x1a64c8)
        };
        assert!(glass.is_blended());
    }

    #[test]
    fn textures_lists_map_then_displacement() {
        let m = Material {
            map: Some(TextureId(1)),
            displacement_map: Some(TextureId(3)),
            ..Material::default()
        };
        assert_eq!(m.textures().collect::<Vec<_>>(), vec![TextureId(1), TextureId(3)]);
    }
}
