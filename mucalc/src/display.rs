use std::fmt::{self, Write};

use crate::{Act, MuCalc, Var};

impl fmt::Display for Act {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Act::True => write!(f, "true"),
            Act::Label(l) => write_label(l, f),
            Act::NotLabel(l) => {
                f.write_char('!')?;
                write_label(l, f)
            }
        }
    }
}

/// Labels that could be read back as something else are quoted.
fn write_label(label: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let plain = !label.is_empty()
        && label != "true"
        && label.chars().all(|c| c.is_alphanumeric() || c == '_');
    if plain {
        return f.write_str(label);
    }

    f.write_char('"')?;
    for c in label.chars() {
        if c == '"' || c == '\\' {
            f.write_char('\\')?;
        }
        f.write_char(c)?;
    }
    f.write_char('"')
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Binding strength, loosest first. A child is wrapped in parentheses when the
// context binds at least as tightly as the child's own operator.
const FIX: u8 = 1;
const OR: u8 = 2;
const AND: u8 = 3;
const MODAL: u8 = 4;

fn write_prec(e: &MuCalc, prec: u8, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let (own, open, close) = match e {
        MuCalc::Mu(..) | MuCalc::Nu(..) => (FIX, "(", ")"),
        MuCalc::Or(es) if es.len() > 1 => (OR, "(", ")"),
        MuCalc::And(es) if es.len() > 1 => (AND, "(", ")"),
        _ => (u8::MAX, "", ""),
    };
    let parens = prec >= own;
    if parens {
        f.write_str(open)?;
    }

    match e {
        MuCalc::True => f.write_str("tt")?,
        MuCalc::False => f.write_str("ff")?,
        MuCalc::Var(x) => write!(f, "{x}")?,
        MuCalc::Diamond(a, e) => {
            write!(f, "<{a}>")?;
            write_prec(e, MODAL, f)?;
        }
        MuCalc::Box(a, e) => {
            write!(f, "[{a}]")?;
            write_prec(e, MODAL, f)?;
        }
        MuCalc::WeakDiamond(a, e) => {
            write!(f, "<<{a}>>")?;
            write_prec(e, MODAL, f)?;
        }
        MuCalc::WeakBox(a, e) => {
            write!(f, "[[{a}]]")?;
            write_prec(e, MODAL, f)?;
        }
        MuCalc::And(es) if es.is_empty() => f.write_str("tt")?,
        MuCalc::Or(es) if es.is_empty() => f.write_str("ff")?,
        MuCalc::And(es) => write_joined(es, " && ", AND, f)?,
        MuCalc::Or(es) => write_joined(es, " || ", OR, f)?,
        MuCalc::Mu(x, e) => {
            write!(f, "mu {x}. ")?;
            write_prec(e, 0, f)?;
        }
        MuCalc::Nu(x, e) => {
            write!(f, "nu {x}. ")?;
            write_prec(e, 0, f)?;
        }
    }

    if parens {
        f.write_str(close)?;
    }
    Ok(())
}

fn write_joined(
    es: &[std::rc::Rc<MuCalc>],
    sep: &str,
    prec: u8,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    for (i, e) in es.iter().enumerate() {
        if i != 0 {
            f.write_str(sep)?;
        }
        write_prec(e, prec, f)?;
    }
    Ok(())
}

/// Writes the formula in the same syntax accepted by [`crate::parse_mucalc`].
impl fmt::Display for MuCalc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_prec(self, 0, f)
    }
}
