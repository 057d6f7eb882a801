use super::Flag;

/// One `:name: value` line below a directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveOption {
    pub flag: Flag,
    pub value: Option<String>,
}
impl DirectiveOption {
    pub fn new(flag: Flag) -> Self {
        Self { flag, value: None }
    }
}
impl From<Flag> for DirectiveOption {
    fn from(flag: Flag) -> Self {
        Self::new(flag)
    }
}

/// An RST directive such as `.. automodule:: integreat_cms.cms.models`
/// together with its option list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub name: String,
    /// The directive argument; for `automodule` the dotted module path.
    pub target: String,
    pub options: Vec<DirectiveOption>,
}
impl Directive {
    pub fn new(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self { name: name.into(), target: target.into(), options: Vec::new() }
    }

    pub fn with(mut self, flag: Flag) -> Self {
        self.options.push(flag.into());
        self
    }

    pub fn has(&self, flag: &Flag) -> bool {
        self.options.iter().any(|o| &o.flag == flag)
    }

    /// Removes every occurrence of `flag`, returning whether any was present.
    pub fn remove(&mut self, flag: &Flag) -> bool {
        let before = self.options.len();
        self.options.retain(|o| &o.flag != flag);
        before != self.options.len()
    }

    /// Adds `option` unless its flag is already present.
    pub fn ensure(&mut self, option: impl Into<DirectiveOption>) -> bool {
        let option = option.into();
        if self.has(&option.flag) {
            return false;
        }
        self.options.push(option);
        true
    }

    /// Inserts `option` directly after the first occurrence of `anchor`,
    /// unless the flag is already present. Returns `false` when nothing was
    /// inserted (flag present, or no anchor).
    pub fn insert_after(&mut self, anchor: &Flag, option: impl Into<DirectiveOption>) -> bool {
        let option = option.into();
        if self.has(&option.flag) {
            return false;
        }
        match self.options.iter().position(|o| &o.flag == anchor) {
            Some(index) => {
                self.options.insert(index + 1, option);
                true
            },
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directive() -> Directive {
        Directive::new("automodule", "integreat_cms.cms.models")
            .with(Flag::Members)
            .with(Flag::UndocumentedMembers)
            .with(Flag::ShowInheritance)
    }

    #[test]
    fn test_insert_after_anchor() {
        let mut d = directive().with(Flag::InheritedMembers);
        assert!(d.insert_after(&Flag::ShowInheritance, Flag::NoIndex));
        let flags: Vec<_> = d.options.iter().map(|o| o.flag.as_str()).collect();
        assert_eq!(flags, ["members", "undoc-members", "show-inheritance", "noindex", "inherited-members"]);
        // Never twice.
        assert!(!d.insert_after(&Flag::ShowInheritance, Flag::NoIndex));
    }

    #[test]
    fn test_insert_without_anchor() {
        let mut d = Directive::new("automodule", "tests").with(Flag::Members);
        assert!(!d.insert_after(&Flag::ShowInheritance, Flag::NoIndex));
        assert!(!d.has(&Flag::NoIndex));
    }

    #[test]
    fn test_remove_and_ensure() {
        let mut d = directive();
        assert!(d.remove(&Flag::UndocumentedMembers));
        assert!(!d.remove(&Flag::UndocumentedMembers));
        assert!(d.ensure(Flag::PrivateMembers));
        assert!(!d.ensure(Flag::PrivateMembers));
        assert_eq!(d.options.len(), 3);
    }
}
