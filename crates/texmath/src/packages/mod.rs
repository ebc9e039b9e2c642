//! Built-in packages: immutable tables of commands, characters and environments.

mod ams;
mod base;
mod bbox;
mod cancel;
mod color;
mod newcommand;
mod noundefined;

use crate::symbols::{Def, EnvDef};

pub(crate) use self::color::{model_color, named_color};

/// A named bundle of definitions.
#[derive(Debug)]
pub(crate) struct Package {
    pub name: &'static str,
    pub commands: &'static phf::Map<&'static str, Def>,
    pub chars: &'static phf::Map<char, Def>,
    pub environments: &'static phf::Map<&'static str, EnvDef>,
    /// Characters that are lexed as active characters.
    pub active: &'static str,
    /// Undefined control sequences are rendered instead of being an error.
    pub renders_undefined: bool,
}

static EMPTY_COMMANDS: phf::Map<&'static str, Def> = phf::phf_map! {};
static EMPTY_CHARS: phf::Map<char, Def> = phf::phf_map! {};
static EMPTY_ENVIRONMENTS: phf::Map<&'static str, EnvDef> = phf::phf_map! {};

static PACKAGES: [&Package; 7] = [
    &base::PACKAGE,
    &ams::PACKAGE,
    &newcommand::PACKAGE,
    &noundefined::PACKAGE,
    &bbox::PACKAGE,
    &cancel::PACKAGE,
    &color::PACKAGE,
];

pub(crate) fn get_package(name: &str) -> Option<&'static Package> {
    PACKAGES.iter().copied().find(|package| package.name == name)
}

/// The packages loaded for one converter, in registration order.
///
/// Lookups walk the list from the end, so a later package shadows an earlier one.
#[derive(Debug, Clone, Default)]
pub(crate) struct PackageList(Vec<&'static Package>);

impl PackageList {
    /// Resolve package names; `base` is always loaded first.
    pub(crate) fn resolve<S: AsRef<str>>(names: &[S]) -> Result<Self, String> {
        let mut packages = vec![&base::PACKAGE];
        for name in names {
            let name = name.as_ref();
            let Some(package) = get_package(name) else {
                return Err(name.to_string());
            };
            if !packages.iter().any(|loaded| loaded.name == package.name) {
                packages.push(package);
            }
        }
        Ok(PackageList(packages))
    }

    pub(crate) fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().map(|package| package.name)
    }

    pub(crate) fn command(&self, name: &str) -> Option<&'static Def> {
        self.0.iter().rev().find_map(|package| package.commands.get(name))
    }

    pub(crate) fn char(&self, ch: char) -> Option<&'static Def> {
        self.0.iter().rev().find_map(|package| package.chars.get(&ch))
    }

    pub(crate) fn environment(&self, name: &str) -> Option<&'static EnvDef> {
        self.0
            .iter()
            .rev()
            .find_map(|package| package.environments.get(name))
    }

    pub(crate) fn active_chars(&self) -> String {
        let mut active = String::new();
        for package in &self.0 {
            for ch in package.active.chars() {
                if !active.contains(ch) {
                    active.push(ch);
                }
            }
        }
        active
    }

    pub(crate) fn renders_undefined(&self) -> bool {
        self.0.iter().any(|package| package.renders_undefined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::{Def, Prim};

    #[test]
    fn base_is_always_first() {
        let list = PackageList::resolve(&["ams", "base", "ams"]).unwrap();
        assert_eq!(list.names().collect::<Vec<_>>(), ["base", "ams"]);
        assert_eq!(PackageList::resolve(&["physics"]).unwrap_err(), "physics");
    }

    #[test]
    fn later_packages_shadow_earlier_ones() {
        let base_only = PackageList::resolve::<&str>(&[]).unwrap();
        assert!(base_only.command("tag").is_none());
        let with_ams = PackageList::resolve(&["ams"]).unwrap();
        assert!(matches!(with_ams.command("tag"), Some(Def::Prim(Prim::Tag))));
        // `\binom` exists in both; the AMS version (no fixed style) wins.
        assert!(matches!(
            with_ams.command("binom"),
            Some(Def::Prim(Prim::Binom(None)))
        ));
    }

    #[test]
    fn active_characters_are_collected() {
        let list = PackageList::resolve(&["ams", "color"]).unwrap();
        assert_eq!(list.active_chars(), "~");
        assert!(!list.renders_undefined());
        let list = PackageList::resolve(&["noundefined"]).unwrap();
        assert!(list.renders_undefined());
    }
}
