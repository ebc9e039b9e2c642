use super::{EMPTY_CHARS, EMPTY_COMMANDS, EMPTY_ENVIRONMENTS, Package};

/// Renders undefined control sequences as red text.
pub(super) static PACKAGE: Package = Package {
    name: "noundefined",
    commands: &EMPTY_COMMANDS,
    chars: &EMPTY_CHARS,
    environments: &EMPTY_ENVIRONMENTS,
    active: "",
    renders_undefined: true,
};
