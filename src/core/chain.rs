//! Ordered, possibly nested, command chains

use crate::core::command::CommandSpec;

/// One element of a chain
#[derive(Debug, Clone)]
pub enum Link {
    Command(CommandSpec),
    Nested(Chain),
}

/// An ordered sequence of commands and sub-chains
///
/// Nesting only groups commands logically; flattening yields them in the
/// same left-to-right order a flat sequence would.
#[derive(Debug, Clone, Default)]
pub struct Chain {
    links: Vec<Link>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command
    pub fn then(mut self, command: CommandSpec) -> Self {
        self.links.push(Link::Command(command));
        self
    }

    /// Append a nested chain
    pub fn then_chain(mut self, chain: Chain) -> Self {
        self.links.push(Link::Nested(chain));
        self
    }

    pub fn push(&mut self, link: Link) {
        self.links.push(link);
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn is_empty(&self) -> bool {
        self.links.iter().all(|link| match link {
            Link::Command(_) => false,
            Link::Nested(chain) => chain.is_empty(),
        })
    }

    /// Number of commands after flattening
    pub fn len(&self) -> usize {
        self.links
            .iter()
            .map(|link| match link {
                Link::Command(_) => 1,
                Link::Nested(chain) => chain.len(),
            })
            .sum()
    }

    /// Flatten the tree depth-first into execution order
    pub fn flatten(self) -> Vec<CommandSpec> {
        let mut out = Vec::with_capacity(self.len());
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into(self, out: &mut Vec<CommandSpec>) {
        for link in self.links {
            match link {
                Link::Command(cmd) => out.push(cmd),
                Link::Nested(chain) => chain.flatten_into(out),
            }
        }
    }
}

impl From<Vec<CommandSpec>> for Chain {
    fn from(commands: Vec<CommandSpec>) -> Self {
        Self {
            links: commands.into_iter().map(Link::Command).collect(),
        }
    }
}

impl FromIterator<CommandSpec> for Chain {
    fn from_iter<T: IntoIterator<Item = CommandSpec>>(iter: T) -> Self {
        Self {
            links: iter.into_iter().map(Link::Command).collect(),
        }
    }
}

impl FromIterator<Chain> for Chain {
    fn from_iter<T: IntoIterator<Item = Chain>>(iter: T) -> Self {
        Self {
            links: iter.into_iter().map(Link::Nested).collect(),
        }
    }
}
