use super::{EMPTY_CHARS, EMPTY_ENVIRONMENTS, Package};
use crate::symbols::{Def, Prim};

pub(super) static PACKAGE: Package = Package {
    name: "newcommand",
    commands: &COMMANDS,
    chars: &EMPTY_CHARS,
    environments: &EMPTY_ENVIRONMENTS,
    active: "",
    renders_undefined: false,
};

static COMMANDS: phf::Map<&'static str, Def> = phf::phf_map! {
    "newcommand" => Def::Prim(Prim::NewCommand),
    "renewcommand" => Def::Prim(Prim::NewCommand),
    "def" => Def::Prim(Prim::Def),
    "let" => Def::Prim(Prim::Let),
};
