use super::{Mode, ParsedTimeControl, Period, parse_u32};

pub(super) fn try_strict_parse(input: &str) -> Option<ParsedTimeControl> {
    if input == "?" {
        return Some(ParsedTimeControl {
            raw: input.to_string(),
            periods: Vec::new(),
            mode: Mode::Unknown,
        });
    }

    if input == "-" {
        return Some(ParsedTimeControl {
            raw: input.to_string(),
            periods: Vec::new(),
            mode: Mode::Unlimited,
        });
    }

    if let Some(secs_str) = input.strip_prefix('*') {
        let secs = parse_u32(secs_str)?;
        return Some(ParsedTimeControl {
            raw: input.to_string(),
            periods: vec![Period {
                moves: None,
                base_seconds: secs,
                increment_seconds: None,
            }],
            mode: Mode::Sandclock,
        });
    }

    let periods = input
        .split(':')
        .map(parse_stage)
        .collect::<Option<Vec<Period>>>()?;

    Some(ParsedTimeControl {
        raw: input.to_string(),
        periods,
        mode: Mode::Normal,
    })
}

pub(super) fn parse_stage(s: &str) -> Option<Period> {
    let (base_part, inc_part) = match s.split_once('+') {
        Some((base, inc)) => (base, Some(inc)),
        None => (s, None),
    };

    let (moves, base_str) = match base_part.split_once('/') {
        Some((moves, base)) => (Some(parse_u32(moves)?), base),
        None => (None, base_part),
    };

    let base_seconds = parse_u32(base_str)?;
    let increment_seconds = match inc_part {
        Some(inc_str) => Some(parse_u32(inc_str)?),
        None => None,
    };

    Some(Period {
        moves,
        base_seconds,
        increment_seconds,
    })
}
