use super::{EMPTY_CHARS, EMPTY_ENVIRONMENTS, Package};
use crate::symbols::{Def, Prim};

pub(super) static PACKAGE: Package = Package {
    name: "cancel",
    commands: &COMMANDS,
    chars: &EMPTY_CHARS,
    environments: &EMPTY_ENVIRONMENTS,
    active: "",
    renders_undefined: false,
};

static COMMANDS: phf::Map<&'static str, Def> = phf::phf_map! {
    "cancel" => Def::Prim(Prim::Enclose("updiagonalstrike")),
    "bcancel" => Def::Prim(Prim::Enclose("downdiagonalstrike")),
    "xcancel" => Def::Prim(Prim::Enclose("updiagonalstrike downdiagonalstrike")),
    "cancelto" => Def::Prim(Prim::CancelTo),
};
