use std::rc::Rc;

use anyhow::{anyhow, Result};
use chumsky::error::Simple;
use chumsky::primitive::{choice, end, filter, just, one_of};
use chumsky::recursive::recursive;
use chumsky::text::{self, TextParser};
use chumsky::Parser;

use crate::{Act, MuCalc, Var};

// <Atom> ::= `tt' | `true' | `ff' | `false' | `(' <MuCalc> `)' | <Id>
// <Modal> ::= `<' <Act> `>' <Modal> | `[' <Act> `]' <Modal>
//          | `<<' <Act> `>>' <Modal> | `[[' <Act> `]]' <Modal>
//          | <Atom>
// <Conjunction> ::= <Modal> (`&&' <Modal>)*
// <Disjunction> ::= <Conjunction> (`||' <Conjunction>)*
// <MuCalc> ::= `mu' <Id> `.' <MuCalc> | `nu' <Id> `.' <MuCalc> | <Disjunction>
// <Act> ::= `true' | <Label> | `!' <Label>
// <Label> ::= `"' ( any char, with `\"' and `\\' escaped ) `"'
//          | ( no brackets, `!', `"' or spaces )
// <Id> ::= ( a C-style identifier )
pub fn parse_mucalc(source: &str) -> Result<MuCalc, Vec<Simple<char>>> {
    let expr = recursive(|expr| {
        let var = text::ident().map(Var).padded();

        let plain = filter(|c: &char| !"<>[]!\"".contains(*c) && !c.is_whitespace())
            .repeated()
            .at_least(1)
            .collect::<String>();
        let escape = just('\\').ignore_then(one_of("\\\""));
        let quoted = filter(|c: &char| *c != '\\' && *c != '"')
            .or(escape)
            .repeated()
            .delimited_by(just('"'), just('"'))
            .collect::<String>();
        let label = quoted.or(plain);
        let act_true = text::keyword("true").to(Act::True);
        let act_not_label = just('!').padded().ignore_then(label.clone().map(Act::NotLabel));
        let act_label = label.map(Act::Label);
        let act = choice((act_true, act_not_label, act_label)).padded().boxed();

        let tt = choice((text::keyword("tt"), text::keyword("true"))).to(MuCalc::True);
        let ff = choice((text::keyword("ff"), text::keyword("false"))).to(MuCalc::False);
        let group = expr.clone().delimited_by(just('('), just(')'));
        let var_atom = var.clone().map(MuCalc::Var);
        let atom = choice((tt, ff, group, var_atom)).padded().boxed();

        let modal = recursive(move |modal| {
            let op = |open, close| act.clone().delimited_by(just(open), just(close)).padded();
            let operand = || modal.clone().map(Rc::new);

            // The doubled brackets must be tried before the single ones.
            let weak_diam = op("<<", ">>").then(operand()).map(|(a, e)| MuCalc::WeakDiamond(a, e));
            let weak_box = op("[[", "]]").then(operand()).map(|(a, e)| MuCalc::WeakBox(a, e));
            let diam = op("<", ">").then(operand()).map(|(a, e)| MuCalc::Diamond(a, e));
            let boxx = op("[", "]").then(operand()).map(|(a, e)| MuCalc::Box(a, e));

            choice((weak_diam, weak_box, diam, boxx, atom.clone())).boxed()
        });

        let and = modal.separated_by(just("&&").padded()).at_least(1).map(MuCalc::and);
        let or = and.separated_by(just("||").padded()).at_least(1).map(MuCalc::or);

        let dot = just('.').padded();
        let binder = |kw| text::keyword(kw).padded().ignore_then(var.clone());
        let fix = |kw| binder(kw).then_ignore(dot.clone()).then(expr.clone());
        let mu = fix("mu").map(|(x, e)| MuCalc::Mu(x, Rc::new(e)));
        let nu = fix("nu").map(|(x, e)| MuCalc::Nu(x, Rc::new(e)));

        choice((mu, nu, or)).padded().boxed()
    });

    expr.then_ignore(end()).parse(source)
}

/// Parses a formula, turning the parser errors into a readable report.
pub fn parse_formula(source: &str) -> Result<MuCalc> {
    parse_mucalc(source).map_err(|errors| {
        let report = errors
            .iter()
            .map(|e| format!("{e} at {}..{}", e.span().start, e.span().end))
            .collect::<Vec<_>>()
            .join("; ");
        anyhow!("Failed to parse formula: {report}")
    })
}
