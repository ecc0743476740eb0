use log::warn;

/// Four-channel color carried by every page. The core never interprets it;
/// it only round-trips the value through the workspace index file for the
/// color-picker UI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
    pub alpha: f32,
}

impl Default for Rgba {
    fn default() -> Self {
        Self {
            red: 0.7,
            green: 0.7,
            blue: 1.0,
            alpha: 1.0,
        }
    }
}

impl Rgba {
    pub fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Format as a CSS color string: `rgb(r,g,b)` for opaque colors,
    /// `rgba(r,g,b,a)` otherwise, with 0-255 integer channels.
    pub fn to_css_string(&self) -> String {
        let r = channel_to_u8(self.red);
        let g = channel_to_u8(self.green);
        let b = channel_to_u8(self.blue);
        if self.alpha >= 1.0 {
            format!("rgb({r},{g},{b})")
        } else {
            format!("rgba({r},{g},{b},{})", self.alpha)
        }
    }

    /// Parse `rgb(..)`, `rgba(..)` or `#rrggbb` color strings.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() != 6 {
                return None;
            }
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            return Some(Self::new(
                f32::from(r) / 255.0,
                f32::from(g) / 255.0,
                f32::from(b) / 255.0,
                1.0,
            ));
        }

        let (body, has_alpha) = if let Some(rest) = s.strip_prefix("rgba(") {
            (rest.strip_suffix(')')?, true)
        } else if let Some(rest) = s.strip_prefix("rgb(") {
            (rest.strip_suffix(')')?, false)
        } else {
            return None;
        };

        let mut parts = body.split(',').map(str::trim);
        let r: u8 = parts.next()?.parse().ok()?;
        let g: u8 = parts.next()?.parse().ok()?;
        let b: u8 = parts.next()?.parse().ok()?;
        let alpha: f32 = if has_alpha {
            parts.next()?.parse().ok()?
        } else {
            1.0
        };
        if parts.next().is_some() {
            return None;
        }
        Some(Self::new(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            alpha,
        ))
    }

    /// Parse a color string, falling back to the default color when the
    /// value is unusable. Index rows hand-edited into garbage should not
    /// abort a workspace load.
    pub fn parse_or_default(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|| {
            warn!("unparseable color string {s:?}, using default");
            Self::default()
        })
    }
}

fn channel_to_u8(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}
