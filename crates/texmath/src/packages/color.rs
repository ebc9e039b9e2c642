use super::{EMPTY_CHARS, EMPTY_ENVIRONMENTS, Package};
use crate::symbols::{Def, Prim};

pub(super) static PACKAGE: Package = Package {
    name: "color",
    commands: &COMMANDS,
    chars: &EMPTY_CHARS,
    environments: &EMPTY_ENVIRONMENTS,
    active: "",
    renders_undefined: false,
};

static COMMANDS: phf::Map<&'static str, Def> = phf::phf_map! {
    "color" => Def::Prim(Prim::Color),
    "textcolor" => Def::Prim(Prim::TextColor),
    "colorbox" => Def::Prim(Prim::ColorBox),
    "definecolor" => Def::Prim(Prim::DefineColor),
};

/// The dvips colour names, and the CSS names that are passed through unchanged.
static COLORS: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "Apricot" => "#FBB982",
    "Aquamarine" => "#00B5BE",
    "Bittersweet" => "#C04F17",
    "Black" => "#221E1F",
    "Blue" => "#2D2F92",
    "BlueGreen" => "#00B3B8",
    "BlueViolet" => "#473992",
    "BrickRed" => "#B6321C",
    "Brown" => "#792500",
    "BurntOrange" => "#F7921D",
    "CadetBlue" => "#74729A",
    "CarnationPink" => "#F282B4",
    "Cerulean" => "#00A2E3",
    "CornflowerBlue" => "#41B0E4",
    "Cyan" => "#00AEEF",
    "Dandelion" => "#FDBC42",
    "DarkOrchid" => "#A4538A",
    "Emerald" => "#00A99D",
    "ForestGreen" => "#009B55",
    "Fuchsia" => "#8C368C",
    "Goldenrod" => "#FFDF42",
    "Gray" => "#949698",
    "Green" => "#00A64F",
    "GreenYellow" => "#DFE674",
    "JungleGreen" => "#00A99A",
    "Lavender" => "#F49EC4",
    "LimeGreen" => "#8DC73E",
    "Magenta" => "#EC008C",
    "Mahogany" => "#A9341F",
    "Maroon" => "#AF3235",
    "Melon" => "#F89E7B",
    "MidnightBlue" => "#006795",
    "Mulberry" => "#A93C93",
    "NavyBlue" => "#006EB8",
    "OliveGreen" => "#3C8031",
    "Orange" => "#F58137",
    "OrangeRed" => "#ED135A",
    "Orchid" => "#AF72B0",
    "Peach" => "#F7965A",
    "Periwinkle" => "#7977B8",
    "PineGreen" => "#008B72",
    "Plum" => "#92268F",
    "ProcessBlue" => "#00B0F0",
    "Purple" => "#99479B",
    "RawSienna" => "#974006",
    "Red" => "#ED1B23",
    "RedOrange" => "#F26035",
    "RedViolet" => "#A1246B",
    "Rhodamine" => "#EF559F",
    "RoyalBlue" => "#0071BC",
    "RoyalPurple" => "#613F99",
    "RubineRed" => "#ED017D",
    "Salmon" => "#F69289",
    "SeaGreen" => "#3FBC9D",
    "Sepia" => "#671800",
    "SkyBlue" => "#46C5DD",
    "SpringGreen" => "#C6DC67",
    "Tan" => "#DA9D76",
    "TealBlue" => "#00AEB3",
    "Thistle" => "#D883B7",
    "Turquoise" => "#00B4CE",
    "Violet" => "#58429B",
    "VioletRed" => "#EF58A0",
    "White" => "#FFFFFF",
    "WildStrawberry" => "#EE2967",
    "Yellow" => "#FFF200",
    "YellowGreen" => "#98CC70",
    "YellowOrange" => "#FAA21A",
    "aqua" => "aqua",
    "black" => "black",
    "blue" => "blue",
    "brown" => "brown",
    "cyan" => "cyan",
    "darkblue" => "darkblue",
    "darkgreen" => "darkgreen",
    "darkred" => "darkred",
    "fuchsia" => "fuchsia",
    "gold" => "gold",
    "gray" => "gray",
    "green" => "green",
    "grey" => "grey",
    "indigo" => "indigo",
    "lightblue" => "lightblue",
    "lightgray" => "lightgray",
    "lime" => "lime",
    "magenta" => "magenta",
    "maroon" => "maroon",
    "navy" => "navy",
    "olive" => "olive",
    "orange" => "orange",
    "pink" => "pink",
    "purple" => "purple",
    "red" => "red",
    "silver" => "silver",
    "teal" => "teal",
    "violet" => "violet",
    "white" => "white",
    "yellow" => "yellow",
};

/// Resolve a colour name or a `#RGB` / `#RRGGBB` literal.
pub(crate) fn named_color(name: &str) -> Option<String> {
    let name = name.trim();
    if let Some(value) = COLORS.get(name) {
        return Some((*value).to_string());
    }
    let hex = name.strip_prefix('#')?;
    (matches!(hex.len(), 3 | 6) && hex.bytes().all(|b| b.is_ascii_hexdigit()))
        .then(|| name.to_string())
}

/// Convert a colour given in one of the `xcolor` models to a CSS colour.
pub(crate) fn model_color(model: &str, spec: &str) -> Option<String> {
    let spec = spec.trim();
    match model.trim() {
        "named" => named_color(spec),
        "HTML" => (spec.len() == 6 && spec.bytes().all(|b| b.is_ascii_hexdigit()))
            .then(|| format!("#{}", spec.to_ascii_uppercase())),
        "rgb" => {
            let channels = components::<3>(spec, parse_unit_float)?;
            Some(hex_color(channels))
        }
        "RGB" => {
            let channels = components::<3>(spec, |part| part.parse::<u8>().ok())?;
            Some(hex_color(channels))
        }
        "gray" => {
            let [value] = components::<1>(spec, parse_unit_float)?;
            Some(hex_color([value; 3]))
        }
        _ => None,
    }
}

fn parse_unit_float(part: &str) -> Option<u8> {
    let value = part.parse::<f32>().ok()?;
    (0.0..=1.0)
        .contains(&value)
        .then(|| (value * 255.0).round() as u8)
}

fn components<const N: usize>(spec: &str, parse: impl Fn(&str) -> Option<u8>) -> Option<[u8; N]> {
    let mut channels = [0u8; N];
    let mut parts = spec.split(',');
    for channel in channels.iter_mut() {
        *channel = parse(parts.next()?.trim())?;
    }
    parts.next().is_none().then_some(channels)
}

fn hex_color(channels: [u8; 3]) -> String {
    let [r, g, b] = channels;
    format!("#{r:02X}{g:02X}{b:02X}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names() {
        assert_eq!(named_color("red").as_deref(), Some("red"));
        assert_eq!(named_color("Apricot").as_deref(), Some("#FBB982"));
        assert_eq!(named_color("#0a0").as_deref(), Some("#0a0"));
        assert_eq!(named_color("#0a"), None);
        assert_eq!(named_color("reddish"), None);
    }

    #[test]
    fn models() {
        assert_eq!(model_color("rgb", "1, 0.5, 0").as_deref(), Some("#FF8000"));
        assert_eq!(model_color("RGB", "0,128,255").as_deref(), Some("#0080FF"));
        assert_eq!(model_color("gray", ".5").as_deref(), Some("#808080"));
        assert_eq!(model_color("HTML", "ff00aa").as_deref(), Some("#FF00AA"));
        assert_eq!(model_color("rgb", "1,2,3"), None);
        assert_eq!(model_color("rgb", "1,0"), None);
        assert_eq!(model_color("cmyk", "0,0,0,1"), None);
    }
}
