//! Assertions on flattened Verilog netlists, as written by Yosys after
//! synthesis.
//!
//! Only continuous assignments of the form `assign <net> = <net or literal>;`
//! are looked at.

use std::{fmt, path::Path, sync::LazyLock};

use regex::Regex;

use crate::{
    encoding::{normalize_line_endings, read_text},
    Encoding, Result,
};

static ASSIGN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[\t ]*assign[\t ]+([a-zA-Z0-9_\\.\[:\]]+)[\t ]*=[\t ]*([a-zA-Z0-9_\\.\[:\]']+)[\t ]*;[\t ]*$",
    )
    .unwrap()
});

static LITERALS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"^[0-9]+$").unwrap(),
        Regex::new(r"^[0-9]+'h[0-9a-fA-FxX]+$").unwrap(),
        Regex::new(r"^[0-9]+'b[01xX]+$").unwrap(),
    ]
});

/// Decimal, sized hexadecimal or sized binary constant
pub fn is_literal(expression: &str) -> bool {
    LITERALS.iter().any(|re| re.is_match(expression))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assign {
    pub lhs: String,
    pub rhs: String,
}

#[derive(Debug, Clone, Default)]
pub struct VerilogModule {
    assigns: Vec<Assign>,
}

impl VerilogModule {
    pub fn parse(text: &str) -> Self {
        let text = normalize_line_endings(text);
        let assigns = ASSIGN
            .captures_iter(&text)
            .map(|caps| Assign {
                lhs: caps[1].to_owned(),
                rhs: caps[2].to_owned(),
            })
            .collect::<Vec<_>>();
        tracing::debug!("Found {} assign statements", assigns.len());
        Self { assigns }
    }

    pub fn from_file(path: impl AsRef<Path>, encoding: Encoding) -> Result<Self> {
        Ok(Self::parse(&read_text(path, encoding)?))
    }

    pub fn assigns(&self) -> &[Assign] {
        &self.assigns
    }

    /// The assignment driving `net`, ignoring case
    pub fn find_assign(&self, net: &str) -> Option<&Assign> {
        self.assigns
            .iter()
            .find(|assign| assign.lhs.eq_ignore_ascii_case(net))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assertion {
    NetExists(String),
    /// Holds for undriven nets as well
    NetIsConstant(String),
    NetIsNotConstant(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionOutcome {
    pub passed: bool,
    pub message: String,
}

impl AssertionOutcome {
    fn new(passed: bool, message: String) -> Self {
        Self { passed, message }
    }
}

impl Assertion {
    pub fn net(&self) -> &str {
        match self {
            Assertion::NetExists(net)
            | Assertion::NetIsConstant(net)
            | Assertion::NetIsNotConstant(net) => net,
        }
    }

    pub fn check(&self, module: &VerilogModule) -> AssertionOutcome {
        let net = self.net();
        let assign = module.find_assign(net);
        match (self, assign) {
            (Assertion::NetExists(_), None) => {
                AssertionOutcome::new(false, format!("Net {net} is not part of the design."))
            }
            (Assertion::NetExists(_), Some(_)) => {
                AssertionOutcome::new(true, format!("Net {net} is part of the design."))
            }
            (Assertion::NetIsConstant(_), None) => {
                AssertionOutcome::new(true, format!("Net {net} is not driven at all."))
            }
            (Assertion::NetIsNotConstant(_), None) => {
                AssertionOutcome::new(false, format!("Net {net} is not driven at all."))
            }
            (_, Some(assign)) if is_literal(&assign.rhs) => AssertionOutcome::new(
                matches!(self, Assertion::NetIsConstant(_)),
                format!("Net {net} is driven by constant {}.", assign.rhs),
            ),
            (_, Some(_)) => AssertionOutcome::new(
                matches!(self, Assertion::NetIsNotConstant(_)),
                format!("Net {net} is driven by something but not by a constant."),
            ),
        }
    }
}

impl fmt::Display for Assertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Assertion::NetExists(_) => "net_exists",
            Assertion::NetIsConstant(_) => "net_is_constant",
            Assertion::NetIsNotConstant(_) => "net_is_not_constant",
        };
        write!(f, "{}(\"{}\")", name, self.net())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionReport {
    pub assertion: Assertion,
    pub outcome: AssertionOutcome,
}

impl fmt::Display for AssertionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.outcome.passed {
            write!(f, "[SUCCESS] {}", self.assertion)
        } else {
            write!(f, "[FAILED]  {}", self.assertion)
        }
    }
}

/// A list of assertions a design has to fulfill
#[derive(Debug, Clone, Default)]
pub struct Assertions {
    assertions: Vec<Assertion>,
}

impl Assertions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, assertion: Assertion) {
        self.assertions.push(assertion);
    }

    pub fn apply(&self, module: &VerilogModule) -> Vec<AssertionReport> {
        self.assertions
            .iter()
            .map(|assertion| {
                let outcome = assertion.check(module);
                tracing::info!("{}", outcome.message);
                AssertionReport {
                    assertion: assertion.clone(),
                    outcome,
                }
            })
            .collect()
    }
}

impl FromIterator<Assertion> for Assertions {
    fn from_iter<T: IntoIterator<Item = Assertion>>(iter: T) -> Self {
        Self {
            assertions: iter.into_iter().collect(),
        }
    }
}
