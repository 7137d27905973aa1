use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Session-local handle for an object in the scene. Never persisted.
pub type ObjectId = u32;

/// Runtime tag of a scene object variant.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Rect,
    Circle,
    Ellipse,
    Triangle,
    Polygon,
    Line,
    Textbox,
    Image,
    Group,
}

/// Active UI tool. Only used to decide whether a selection change should
/// push the UI back to `Select`.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Tool {
    #[default]
    Select,
    Shapes,
    Text,
    Images,
    Draw,
    Fill,
    StrokeColor,
    StrokeWidth,
    Font,
    Opacity,
    CropImage,
    Filter,
    Settings,
    Ai,
    RemoveBg,
    Templates,
}

impl Tool {
    /// Tools whose sidebar edits the current selection and is meaningless without one.
    pub fn requires_selection(self) -> bool {
        matches!(
            self,
            Self::Fill | Self::Font | Self::Filter | Self::Opacity | Self::RemoveBg | Self::StrokeColor | Self::StrokeWidth
        )
    }
}

/// Closed catalog of image filters. `None` clears the filter chain.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum ImageFilter {
    None,
    Polaroid,
    Sepia,
    Kodachrome,
    Contrast,
    Brightness,
    Greyscale,
    Brownie,
    Vintage,
    Technicolor,
    Pixelate,
    Invert,
    Blur,
    Sharpen,
    Emboss,
    Removecolor,
    Blacknwhite,
    Vibrance,
    Blendcolor,
    Huerotate,
    Resize,
    Saturation,
    Gamma,
}

impl ImageFilter {
    pub const ALL: [ImageFilter; 23] = [
        Self::None,
        Self::Polaroid,
        Self::Sepia,
        Self::Kodachrome,
        Self::Contrast,
        Self::Brightness,
        Self::Greyscale,
        Self::Brownie,
        Self::Vintage,
        Self::Technicolor,
        Self::Pixelate,
        Self::Invert,
        Self::Blur,
        Self::Sharpen,
        Self::Emboss,
        Self::Removecolor,
        Self::Blacknwhite,
        Self::Vibrance,
        Self::Blendcolor,
        Self::Huerotate,
        Self::Resize,
        Self::Saturation,
        Self::Gamma,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Polaroid => "polaroid",
            Self::Sepia => "sepia",
            Self::Kodachrome => "kodachrome",
            Self::Contrast => "contrast",
            Self::Brightness => "brightness",
            Self::Greyscale => "greyscale",
            Self::Brownie => "brownie",
            Self::Vintage => "vintage",
            Self::Technicolor => "technicolor",
            Self::Pixelate => "pixelate",
            Self::Invert => "invert",
            Self::Blur => "blur",
            Self::Sharpen => "sharpen",
            Self::Emboss => "emboss",
            Self::Removecolor => "removecolor",
            Self::Blacknwhite => "blacknwhite",
            Self::Vibrance => "vibrance",
            Self::Blendcolor => "blendcolor",
            Self::Huerotate => "huerotate",
            Self::Resize => "resize",
            Self::Saturation => "saturation",
            Self::Gamma => "gamma",
        }
    }
}

impl FromStr for ImageFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.name() == wanted)
            .ok_or_else(|| format!("unknown filter: {s}"))
    }
}

impl fmt::Display for ImageFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
    Oblique,
}

/// Accepts `400`, `"400"`, `"normal"` or `"bold"`.
pub(crate) fn deserialize_font_weight<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Weight {
        Number(f64),
        Text(String),
    }

    match Weight::deserialize(deserializer)? {
        Weight::Number(n) if (1.0..=1000.0).contains(&n) => Ok(n.round() as u16),
        Weight::Number(n) => Err(serde::de::Error::custom(format!("font weight out of range: {n}"))),
        Weight::Text(t) => match t.trim() {
            "normal" => Ok(400),
            "bold" => Ok(700),
            other => other
                .parse::<u16>()
                .map_err(|_| serde::de::Error::custom(format!("invalid font weight: {other}"))),
        },
    }
}

/// Output format for raster export.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum RasterFormat {
    Png,
    Jpeg,
    /// Captured through the raster path; the payload is PNG.
    Svg,
}

impl RasterFormat {
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png | Self::Svg => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}

impl FromStr for RasterFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "svg" => Ok(Self::Svg),
            other => Err(format!("unknown raster format: {other}")),
        }
    }
}

/// Per-document lifecycle.
#[derive(Serialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
#[serde(rename_all = "lowercase")]
pub enum DocumentState {
    #[default]
    Empty,
    Loaded,
    Dirty,
    Disposed,
}
