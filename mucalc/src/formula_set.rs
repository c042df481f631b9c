use std::rc::Rc;

use anyhow::{bail, ensure, Result};
use solver::Map;

use crate::{FixType, MuCalc, Var};

/// Maps each fixpoint variable to the fixpoint formula binding it.
#[derive(Clone, Debug, Default)]
pub struct FormulaSet {
    definitions: Map<Var, Rc<MuCalc>>,
}

impl FormulaSet {
    /// Gathers the binders of `formula`, rejecting formulas that declare a
    /// variable twice, use a variable outside its fixpoint or are not
    /// alternation-free.
    pub fn new(formula: &MuCalc) -> Result<Self> {
        let mut set = Self::default();
        set.gather(formula, &mut Vec::new())?;
        Ok(set)
    }

    pub fn definition(&self, x: &Var) -> Option<&Rc<MuCalc>> {
        self.definitions.get(x)
    }

    fn gather(&mut self, f: &MuCalc, scope: &mut Vec<(Var, FixType)>) -> Result<()> {
        match f {
            MuCalc::True | MuCalc::False => Ok(()),
            MuCalc::Var(x) => {
                ensure!(scope.iter().any(|(y, _)| y == x), "Variable {} not in scope", x.0);
                Ok(())
            }
            MuCalc::Diamond(_, e)
            | MuCalc::Box(_, e)
            | MuCalc::WeakDiamond(_, e)
            | MuCalc::WeakBox(_, e) => self.gather(e, scope),
            MuCalc::And(es) | MuCalc::Or(es) => es.iter().try_for_each(|e| self.gather(e, scope)),
            MuCalc::Mu(x, e) | MuCalc::Nu(x, e) => {
                let fix_type = match f {
                    MuCalc::Mu(..) => FixType::Min,
                    _ => FixType::Max,
                };
                ensure!(!self.definitions.contains_key(x), "Variable {} declared twice", x.0);

                // A fixpoint nested in one of the opposite kind must be solvable on its own.
                for (y, outer) in scope.iter() {
                    if *outer != fix_type && e.mentions(y) {
                        bail!("Formula is not alternation-free: {} depends on {}", x.0, y.0);
                    }
                }

                self.definitions.insert(x.clone(), Rc::new(f.clone()));
                scope.push((x.clone(), fix_type));
                self.gather(e, scope)?;
                scope.pop();
                Ok(())
            }
        }
    }
}
