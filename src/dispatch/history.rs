//! Per-request trace tree.
//!
//! Every dispatched call appends a short action (`resolve(usdc.tkn.eth)`,
//! `addr(op_address)`, `text(avatar)`) to its History node; batched calls
//! get one child per slot. The tree is rendered once per request for logs:
//!
//! ```text
//! multicall[resolve(usdc.tkn.eth)[text(name)],resolve(a.tkn.eth)<Unsupported resolve() method: 0x12345678>]
//! ```

use crate::base::GatewayError;
use std::fmt;

/// Deepest multicall nesting allowed, the outermost call being depth 0.
pub const MULTICALL_MAX_DEPTH: usize = 1;

#[derive(Debug, Clone, Default)]
pub struct History {
    depth: usize,
    actions: Vec<String>,
    children: Vec<History>,
    error: Option<String>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// A root node that already sits `depth` multicalls deep.
    pub fn at_depth(depth: usize) -> Self {
        Self { depth, ..Self::default() }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    pub fn children(&self) -> &[History] {
        &self.children
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn add(&mut self, action: impl Into<String>) {
        self.actions.push(action.into());
    }

    /// Open `n` batch slots one multicall level deeper.
    pub fn descend(&mut self, n: usize) -> Result<&mut [History], GatewayError> {
        if self.depth > MULTICALL_MAX_DEPTH {
            return Err(GatewayError::TooDeep { depth: self.depth });
        }
        let start = self.children.len();
        let depth = self.depth + 1;
        self.children.extend((0..n).map(|_| History::at_depth(depth)));
        Ok(&mut self.children[start..])
    }

    /// Open the child traced for the inner call of a `resolve`.
    ///
    /// Crossing into the resolver layer is not multicall nesting and keeps the depth.
    pub fn enter(&mut self) -> &mut History {
        self.children.push(History::at_depth(self.depth));
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    pub fn fail(&mut self, err: &GatewayError) {
        self.error = Some(err.to_string());
    }
}

impl fmt::Display for History {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.actions.join("."))?;
        if let Some(err) = &self.error {
            return write!(f, "<{}>", err);
        }
        if !self.children.is_empty() {
            f.write_str("[")?;
            for (i, child) in self.children.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{}", child)?;
            }
            f.write_str("]")?;
        }
        Ok(())
    }
}
