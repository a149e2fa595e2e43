use serde::{Deserialize, Serialize};

/// Static text appended to video prompts to bias generation toward motion.
pub const MOTION_MODIFIER: &str = "smooth animation, flowing movement, artistic motion";

/// The closed set of Mexican art styles the service offers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ArtStyle {
    Frida,
    Mural,
    Folk,
}

impl Default for ArtStyle {
    fn default() -> Self {
        ArtStyle::Frida
    }
}

impl ArtStyle {
    /// Resolve a user-supplied style key. Unknown keys fall back to the
    /// default style instead of failing.
    pub fn from_key(key: &str) -> Self {
        match key.trim().to_lowercase().as_str() {
            "frida" => ArtStyle::Frida,
            "mural" => ArtStyle::Mural,
            "folk" => ArtStyle::Folk,
            _ => ArtStyle::default(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtStyle::Frida => "frida",
            ArtStyle::Mural => "mural",
            ArtStyle::Folk => "folk",
        }
    }

    pub fn modifier(&self) -> &'static str {
        match self {
            ArtStyle::Frida => {
                "in the style of Frida Kahlo with vibrant colors, self-portrait elements, flowers in hair, and nature symbolism"
            }
            ArtStyle::Mural => {
                "in the style of Mexican muralism with bold cultural symbols, strong social themes, and dramatic compositions"
            }
            ArtStyle::Folk => {
                "in the style of Mexican folk art with bright traditional colors, intricate patterns, and festive cultural motifs"
            }
        }
    }

    pub fn all() -> &'static [ArtStyle] {
        &[ArtStyle::Frida, ArtStyle::Mural, ArtStyle::Folk]
    }

    /// Enhance a prompt with this style's modifier. Video prompts also get
    /// the static motion descriptor so frames do not come out frozen.
    pub fn enhance(&self, prompt: &str, with_motion: bool) -> String {
        if with_motion {
            format!("{}, {}, {}", prompt, self.modifier(), MOTION_MODIFIER)
        } else {
            format!("{}, {}", prompt, self.modifier())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_keys_resolve() {
        assert_eq!(ArtStyle::from_key("frida"), ArtStyle::Frida);
        assert_eq!(ArtStyle::from_key("mural"), ArtStyle::Mural);
        assert_eq!(ArtStyle::from_key("folk"), ArtStyle::Folk);
        assert_eq!(ArtStyle::from_key("  FOLK  "), ArtStyle::Folk);
    }

    #[test]
    fn test_unknown_key_falls_back_to_default() {
        assert_eq!(ArtStyle::from_key("cubism"), ArtStyle::Frida);
        assert_eq!(ArtStyle::from_key(""), ArtStyle::Frida);
    }

    #[test]
    fn test_enhance_appends_exact_modifier() {
        for style in ArtStyle::all() {
            let enhanced = style.enhance("a garden with butterflies", false);
            assert!(enhanced.starts_with("a garden with butterflies, "));
            assert!(enhanced.ends_with(style.modifier()));
        }
    }

    #[test]
    fn test_enhance_with_motion_appends_motion_modifier() {
        let enhanced = ArtStyle::Mural.enhance("workers and revolution", true);
        assert!(enhanced.starts_with("workers and revolution, "));
        assert!(enhanced.contains(ArtStyle::Mural.modifier()));
        assert!(enhanced.ends_with(MOTION_MODIFIER));
    }
}
