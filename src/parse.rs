use crate::types::{ArrayKind, MapperError, Path, Segment};
use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, tag, take_while1},
    character::complete::{char, digit1, none_of, one_of},
    combinator::{all_consuming, map, map_res, opt, value, verify},
    error::context,
    multi::separated_list1,
    sequence::delimited,
    IResult, Parser,
};
use nom_language::error::VerboseError;

type Res<T, U> = IResult<T, U, VerboseError<T>>;

/// Largest index accepted in an `[n]` annotation. Writes pad arrays up to the index with
/// `null`, so the bound also caps how far a single write can grow an array.
pub const MAX_ARRAY_INDEX: usize = 1 << 20;

/// Parses a path expression into a `Path`.
///
/// ## Arguments
///
/// * `input` - The path expression, e.g. "foo.bar[].baz[2].qux?"
///
/// ## Returns
///
/// Returns a `Path` if successful, or a `MapperError::MalformedPath` if parsing fails.
/// The empty string is the root path.
pub fn parse_path(input: &str) -> Result<Path, MapperError> {
    if input.is_empty() {
        return Ok(Path::root());
    }

    match all_consuming(segments).parse(input) {
        Ok((_, segments)) => Ok(Path::new(input, segments)),
        Err(err) => Err(MapperError::MalformedPath {
            path: input.to_string(),
            reason: format!("{}", err),
        }),
    }
}

fn segments(input: &str) -> Res<&str, Vec<Segment>> {
    separated_list1(char('.'), segment).parse(input)
}

fn segment(input: &str) -> Res<&str, Segment> {
    context(
        "segment",
        verify(raw_segment, |s: &Segment| {
            !s.name.is_empty() || s.array.is_some()
        }),
    )
    .parse(input)
}

fn raw_segment(input: &str) -> Res<&str, Segment> {
    let (input, name) = opt(alt((quoted_key, plain_key))).parse(input)?;
    let (input, leading) = opt(char('?')).parse(input)?;
    let (input, array) = opt(array_annotation).parse(input)?;
    let (input, trailing) = match leading {
        Some(_) => (input, None),
        None => opt(char('?')).parse(input)?,
    };

    Ok((
        input,
        Segment {
            name: name.unwrap_or_default(),
            array,
            nullable: leading.is_some() || trailing.is_some(),
        },
    ))
}

fn array_annotation(input: &str) -> Res<&str, ArrayKind> {
    context(
        "array annotation",
        alt((
            value(ArrayKind::Append, tag("[]+")),
            value(ArrayKind::Plain, tag("[]")),
            map(
                delimited(
                    char('['),
                    map_res(digit1, parse_index),
                    char(']'),
                ),
                ArrayKind::Indexed,
            ),
        )),
    )
    .parse(input)
}

fn parse_index(digits: &str) -> Result<usize, String> {
    match digits.parse::<usize>() {
        Ok(index) if index <= MAX_ARRAY_INDEX => Ok(index),
        _ => Err(format!("array index exceeds {}", MAX_ARRAY_INDEX)),
    }
}

fn plain_key(input: &str) -> Res<&str, String> {
    map(
        take_while1(|c: char| !matches!(c, '.' | '[' | ']' | '?' | '"')),
        |s: &str| s.to_string(),
    )
    .parse(input)
}

fn quoted_key(input: &str) -> Res<&str, String> {
    delimited(
        char('"'),
        escaped_transform(none_of("\\\""), '\\', one_of("\\\"")),
        char('"'),
    )
    .parse(input)
}
