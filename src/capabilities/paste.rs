//! Expiration lookup for paste-style backends.
//!
//! Paste sites offer a fixed table of retention durations. Given the
//! maximum age the user will accept, pick the longest offered duration
//! that does not exceed it.

/// One entry of a site's expiration table, or a requested maximum age.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiration {
    /// Retention in seconds.
    Seconds(u64),
    /// The paste never expires.
    Forever,
}

/// Returns the closest offered expiration not exceeding `max_age`.
///
/// Requesting `Forever` yields `Forever` when offered, else the largest
/// finite option. Returns `None` when every offered duration exceeds the
/// requested maximum.
pub fn closest_expiration(options: &[Expiration], max_age: Expiration) -> Option<Expiration> {
    if max_age == Expiration::Forever && options.contains(&Expiration::Forever) {
        return Some(Expiration::Forever);
    }

    let mut finite: Vec<u64> = options
        .iter()
        .filter_map(|e| match e {
            Expiration::Seconds(s) => Some(*s),
            Expiration::Forever => None,
        })
        .collect();
    finite.sort_unstable_by(|a, b| b.cmp(a));

    for secs in finite {
        match max_age {
            Expiration::Forever => return Some(Expiration::Seconds(secs)),
            Expiration::Seconds(max) if max >= secs => return Some(Expiration::Seconds(secs)),
            Expiration::Seconds(_) => {}
        }
    }

    None
}
