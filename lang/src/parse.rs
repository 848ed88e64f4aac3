use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use chumsky::{prelude::*, span::SimpleSpan};
use tracing::debug;
use variantly::Variantly;

pub type Span = SimpleSpan;

#[derive(Clone, Debug, PartialEq, Eq, Variantly)]
pub enum Arg {
    Number(i64),
    /// Resolved to the label's byte offset at compile time
    Label(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Call {
    pub name: String,
    pub args: Vec<(Arg, Span)>,
    pub span: Span,
}

/// A script statement
///
/// ```text
/// intro:              // label, bound to the current offset
///   instrument(2)
///   play(60); wait(8)
///   jump(intro)
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Variantly)]
pub enum Stmt {
    Label(String, Span),
    Call(Call),
}

fn number<'a>() -> impl Parser<'a, &'a str, i64, extra::Err<Rich<'a, char>>> + Clone {
    let hex = just("0x")
        .ignore_then(
            any()
                .filter(|c: &char| c.is_ascii_hexdigit())
                .repeated()
                .at_least(1)
                .collect::<String>(),
        )
        .map(|digits| (digits, 16));
    let dec = any()
        .filter(|c: &char| c.is_ascii_digit())
        .repeated()
        .at_least(1)
        .collect::<String>()
        .map(|digits| (digits, 10));

    just('-')
        .or_not()
        .then(hex.or(dec))
        .try_map(|(sign, (digits, radix)), span| {
            i64::from_str_radix(&digits, radix)
                .map(|n| if sign.is_some() { -n } else { n })
                .map_err(|e| Rich::custom(span, e))
        })
}

/// `[A-Za-z_][A-Za-z0-9_]*`
fn ident<'a>() -> impl Parser<'a, &'a str, String, extra::Err<Rich<'a, char>>> + Clone {
    any()
        .filter(|c: &char| c.is_ascii_alphabetic() || *c == '_')
        .then(
            any()
                .filter(|c: &char| c.is_ascii_alphanumeric() || *c == '_')
                .repeated()
                .collect::<String>(),
        )
        .map(|(first, rest)| format!("{first}{rest}"))
}

fn parser<'a>() -> impl Parser<'a, &'a str, Vec<Stmt>, extra::Err<Rich<'a, char>>> {
    let ident = ident();

    let arg = number()
        .map(Arg::Number)
        .or(ident.clone().map(Arg::Label))
        .map_with(|arg, e| (arg, e.span()));

    let args = arg
        .padded()
        .separated_by(just(','))
        .allow_trailing()
        .collect::<Vec<_>>()
        .padded()
        .delimited_by(just('('), just(')'));

    let call = ident
        .clone()
        .then_ignore(text::whitespace())
        .then(args)
        .then_ignore(just(';').padded().or_not())
        .map_with(|(name, args), e| {
            Stmt::Call(Call {
                name,
                args,
                span: e.span(),
            })
        });

    let label = ident
        .then_ignore(just(':'))
        .map_with(|name, e| Stmt::Label(name, e.span()));

    let comment = just("//")
        .then(none_of("\n").repeated())
        .padded()
        .ignored();

    comment
        .clone()
        .repeated()
        .ignore_then(choice((label, call)).padded())
        .repeated()
        .collect::<Vec<_>>()
        .then_ignore(comment.repeated())
        .padded()
}

pub fn parse(src: &str) -> Result<Vec<Stmt>, Vec<Rich<'_, char>>> {
    let (stmts, errs) = parser().parse(src).into_output_errors();
    debug!(errors = errs.len(), "parsed script");
    if errs.is_empty() {
        Ok(stmts.unwrap_or_default())
    } else {
        Err(errs)
    }
}

/// Render a labelled report pointing into `src`
pub(crate) fn render(src: &str, span: Span, message: String, reason: String) -> String {
    let mut out = vec![];
    let _ = Report::build(ReportKind::Error, span.into_range())
        .with_config(Config::default().with_color(false))
        .with_message(message)
        .with_label(
            Label::new(span.into_range())
                .with_message(reason)
                .with_color(Color::Red),
        )
        .finish()
        .write(Source::from(src), &mut out);
    String::from_utf8_lossy(&out).into_owned()
}

pub fn render_errors(src: &str, errs: &[Rich<'_, char>]) -> String {
    errs.iter()
        .map(|e| render(src, *e.span(), e.to_string(), e.reason().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{parse, render_errors, Arg, Stmt};

    #[test]
    fn test_parsing() {
        let stmts = parse("play(60) wait(8)").unwrap();
        assert_eq!(stmts.len(), 2);
        let call = stmts[0].clone().unwrap_call();
        assert_eq!(call.name, "play");
        assert_eq!(call.args[0].0, Arg::Number(60));
    }

    #[test]
    fn test_parsing_labels_and_comments() {
        let src = "
            // intro riff
            intro:
                instrument(0x02);
                play(-60) ; db(1, 2, 3,)
                jump(intro) // forever
        ";
        let stmts = parse(src).unwrap();
        assert_eq!(stmts.len(), 5);
        assert!(matches!(&stmts[0], Stmt::Label(name, _) if name == "intro"));

        let instrument = stmts[1].clone().unwrap_call();
        assert_eq!(instrument.args[0].0, Arg::Number(2));

        let play = stmts[2].clone().unwrap_call();
        assert_eq!(play.args[0].0, Arg::Number(-60));

        let db = stmts[3].clone().unwrap_call();
        assert_eq!(db.args.len(), 3);

        let jump = stmts[4].clone().unwrap_call();
        assert_eq!(jump.args[0].0, Arg::Label("intro".to_string()));
    }

    #[test]
    fn test_names_with_digits() {
        let stmts = parse("ticks16(300) wait16(2) a1: jump(a1) _x2: db(1)").unwrap();
        assert_eq!(stmts.len(), 6);
        assert_eq!(stmts[0].clone().unwrap_call().name, "ticks16");
        assert_eq!(stmts[1].clone().unwrap_call().name, "wait16");
        assert!(matches!(&stmts[2], Stmt::Label(name, _) if name == "a1"));
        assert_eq!(
            stmts[3].clone().unwrap_call().args[0].0,
            Arg::Label("a1".to_string())
        );
        assert!(matches!(&stmts[4], Stmt::Label(name, _) if name == "_x2"));
    }

    #[test]
    fn test_empty_argument_lists() {
        let stmts = parse("halt() section( ) playset()").unwrap();
        assert!(stmts.iter().all(|s| s.is_call()));
    }

    #[test]
    fn test_errors_are_reported() {
        let src = "play(60 wait(2)";
        let errs = parse(src).unwrap_err();
        assert!(!errs.is_empty());
        assert!(render_errors(src, &errs).contains("Error"));
    }
}
