use thiserror::Error;

/// The compact `PT#H#M#S` encoding could not be read
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed duration {input:?}: {reason}")]
pub struct MalformedDurationError {
    pub input: String,
    pub reason: &'static str,
}

impl MalformedDurationError {
    fn new(input: &str, reason: &'static str) -> Self {
        Self {
            input: input.to_string(),
            reason,
        }
    }
}

/// Parse an ISO 8601 time duration (`PT1H22M33S`) into total seconds.
///
/// Every field is optional, absent fields count as zero, and fields must
/// appear in H, M, S order.
pub fn parse_duration(input: &str) -> Result<u64, MalformedDurationError> {
    let body = input
        .strip_prefix("PT")
        .ok_or_else(|| MalformedDurationError::new(input, "missing PT prefix"))?;

    let mut total: u64 = 0;
    let mut digits = String::new();
    // H=3, M=2, S=1; each designator must be strictly lower than the last
    let mut last_rank = 4;

    for c in body.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }

        let (rank, unit) = match c {
            'H' => (3, 3600),
            'M' => (2, 60),
            'S' => (1, 1),
            _ => return Err(MalformedDurationError::new(input, "unexpected character")),
        };
        if rank >= last_rank {
            return Err(MalformedDurationError::new(input, "designators out of order"));
        }
        if digits.is_empty() {
            return Err(MalformedDurationError::new(input, "designator without a number"));
        }
        let value: u64 = digits
            .parse()
            .map_err(|_| MalformedDurationError::new(input, "number out of range"))?;
        total = total.saturating_add(value.saturating_mul(unit));
        digits.clear();
        last_rank = rank;
    }

    if !digits.is_empty() {
        return Err(MalformedDurationError::new(input, "trailing number without designator"));
    }

    Ok(total)
}
