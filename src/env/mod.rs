mod block;

pub use block::*;

use std::collections::BTreeMap;

use crate::{Error, Result};

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Variable {
    pub value: String,
    pub exported: bool,
}

/// Shell variables, exported ones are inherited by nested contexts and are
/// the ones persisted to an environment block.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: BTreeMap<String, Variable>,
    modified: bool,
}

/// Names must be non-empty, must not contain `=`, a newline or NUL, and must
/// not start with `#`, which marks comment and padding lines in an [`EnvBlock`].
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('#')
        && !name.contains(|x: char| x == '=' || x == '\n' || x == '\0')
}

fn check_name(name: &str) -> Result<()> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(Error::InvalidVariableName(name.to_owned()))
    }
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Environment holding every variable of `block`, all of them exported.
    pub fn from_block(block: &EnvBlock) -> Self {
        let vars = block
            .iter()
            .filter(|(name, _)| is_valid_name(name))
            .map(|(name, value)| {
                (
                    name.to_owned(),
                    Variable {
                        value: value.to_owned(),
                        exported: true,
                    },
                )
            })
            .collect();

        Self {
            vars,
            modified: false,
        }
    }

    /// Copies the exported variables into `block`, keeping its other entries.
    pub fn write_exported(&self, block: &mut EnvBlock) {
        for (name, value) in self.exported() {
            block.set(name, value);
        }
    }

    pub fn set<V: Into<String>>(&mut self, name: &str, value: V) -> Result<()> {
        check_name(name)?;

        let value = value.into();
        debug!("set {}={:?}", name, value);
        self.vars.entry(name.to_owned()).or_default().value = value;
        self.modified = true;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(|x| x.value.as_str())
    }

    /// Marks `name` for export, an unset variable is created empty.
    pub fn export(&mut self, name: &str) -> Result<()> {
        check_name(name)?;

        debug!("export {}", name);
        self.vars.entry(name.to_owned()).or_default().exported = true;
        self.modified = true;
        Ok(())
    }

    pub fn is_exported(&self, name: &str) -> bool {
        self.vars.get(name).map_or(false, |x| x.exported)
    }

    pub fn exported(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars
            .iter()
            .filter(|(_, x)| x.exported)
            .map(|(name, x)| (name.as_str(), x.value.as_str()))
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{is_valid_name, EnvBlock, Environment};
    use crate::Error;

    #[test]
    fn test_valid_name() {
        crate::tests_init();

        assert!(is_valid_name("prioA"));
        assert!(is_valid_name("boot_once"));
        assert!(is_valid_name("a b"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("a=b"));
        assert!(!is_valid_name("a\nb"));
        assert!(!is_valid_name("a\0"));
        assert!(!is_valid_name("#prio"));
        assert!(!is_valid_name("#"));
        assert!(is_valid_name("prio#A"));
    }

    #[test]
    fn test_set_export() {
        crate::tests_init();

        let mut env = Environment::new();
        assert!(!env.is_modified());

        env.set("prioA", "3").unwrap();
        assert_eq!(env.get("prioA"), Some("3"));
        assert!(!env.is_exported("prioA"));
        assert_eq!(env.exported().count(), 0);

        env.export("prioA").unwrap();
        assert!(env.is_exported("prioA"));
        env.set("prioA", "15").unwrap();
        assert!(env.is_exported("prioA"));
        assert_eq!(env.get("prioA"), Some("15"));

        env.export("empty").unwrap();
        assert_eq!(env.get("empty"), Some(""));

        assert_eq!(
            env.exported().collect::<Vec<_>>(),
            vec![("empty", ""), ("prioA", "15")]
        );
        assert!(env.is_modified());

        assert!(matches!(
            env.set("a=b", "1"),
            Err(Error::InvalidVariableName(_))
        ));
        assert!(matches!(env.export(""), Err(Error::InvalidVariableName(_))));
        assert_eq!(env.len(), 2);
    }

    #[test]
    fn test_block_round_trip() {
        crate::tests_init();

        let mut block = EnvBlock::new();
        block.set("saved_entry", "gnulinux");

        let mut env = Environment::from_block(&block);
        assert!(env.is_exported("saved_entry"));
        assert!(!env.is_modified());

        env.set("prioA", "3").unwrap();
        env.export("prioA").unwrap();
        env.set("scratch", "not exported").unwrap();
        env.write_exported(&mut block);

        let block = EnvBlock::parse(&block.to_bytes().unwrap()).unwrap();
        assert_eq!(block.get("saved_entry"), Some("gnulinux"));
        assert_eq!(block.get("prioA"), Some("3"));
        assert_eq!(block.get("scratch"), None);
        assert_eq!(block.len(), 2);
    }

    #[test]
    fn test_exported_names_survive_block() {
        crate::tests_init();

        let mut env = Environment::new();
        assert!(matches!(
            env.set("#prio", "3"),
            Err(Error::InvalidVariableName(_))
        ));
        assert!(matches!(
            env.export("#prio"),
            Err(Error::InvalidVariableName(_))
        ));
        assert!(!env.is_modified());

        for name in ["prio#A", "prio A", "p"].iter() {
            env.set(name, "3").unwrap();
            env.export(name).unwrap();
        }

        let mut block = EnvBlock::new();
        env.write_exported(&mut block);
        let block = EnvBlock::parse(&block.to_bytes().unwrap()).unwrap();

        let reloaded = Environment::from_block(&block);
        assert_eq!(
            reloaded.exported().collect::<Vec<_>>(),
            env.exported().collect::<Vec<_>>()
        );
    }
}
