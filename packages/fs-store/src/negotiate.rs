//! `Accept` header parsing and media type selection.

/// One media range of an `Accept` header.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRange {
    pub kind: String,
    pub subtype: String,
    pub q: f32,
}

impl MediaRange {
    fn parse(range: &str) -> Option<Self> {
        let mut params = range.split(';');
        let media = params.next()?.trim().to_ascii_lowercase();
        let (kind, subtype) = media.split_once('/')?;
        if kind.is_empty() || subtype.is_empty() {
            return None;
        }
        let q = params
            .filter_map(|param| param.split_once('='))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("q"))
            .and_then(|(_, value)| value.trim().parse::<f32>().ok())
            .unwrap_or(1.0)
            .clamp(0.0, 1.0);
        Some(Self {
            kind: kind.to_string(),
            subtype: subtype.to_string(),
            q,
        })
    }

    /// 2 for an exact match, 1 for `type/*`, 0 for `*/*`.
    fn specificity(&self, kind: &str, subtype: &str) -> Option<u8> {
        if self.kind == "*" && self.subtype == "*" {
            Some(0)
        } else if self.kind == kind && self.subtype == "*" {
            Some(1)
        } else if self.kind == kind && self.subtype == subtype {
            Some(2)
        } else {
            None
        }
    }

    pub fn is_concrete(&self) -> bool {
        self.kind != "*" && self.subtype != "*"
    }

    pub fn media_type(&self) -> String {
        format!("{}/{}", self.kind, self.subtype)
    }
}

/// Parse an `Accept` value. A missing or empty header accepts everything.
pub fn parse_accept(accept: Option<&str>) -> Vec<MediaRange> {
    let ranges: Vec<MediaRange> = accept
        .unwrap_or_default()
        .split(',')
        .filter_map(MediaRange::parse)
        .collect();
    if ranges.is_empty() {
        return vec![MediaRange {
            kind: "*".to_string(),
            subtype: "*".to_string(),
            q: 1.0,
        }];
    }
    ranges
}

/// Quality of `media_type` and the index of the range that granted it.
///
/// The most specific matching range decides; the first one wins a tie.
fn quality(ranges: &[MediaRange], media_type: &str) -> Option<(f32, usize)> {
    let media_type = media_type.to_ascii_lowercase();
    let (kind, subtype) = media_type.split_once('/')?;
    let mut best: Option<(u8, f32, usize)> = None;
    for (index, range) in ranges.iter().enumerate() {
        if let Some(specificity) = range.specificity(kind, subtype) {
            let better = match best {
                Some((current, _, _)) => specificity > current,
                None => true,
            };
            if better {
                best = Some((specificity, range.q, index));
            }
        }
    }
    best.filter(|(_, q, _)| *q > 0.0).map(|(_, q, index)| (q, index))
}

/// Whether `media_type` is acceptable at all.
pub fn accepts(accept: Option<&str>, media_type: &str) -> bool {
    quality(&parse_accept(accept), media_type).is_some()
}

/// The most preferred of `available`, or `None` if none is acceptable.
///
/// Ordered by quality, then by the position of the granting range in the
/// header, then by the order of `available`.
pub fn preferred<'a>(accept: Option<&str>, available: &[&'a str]) -> Option<&'a str> {
    let ranges = parse_accept(accept);
    let mut candidates: Vec<(f32, usize, usize, &'a str)> = available
        .iter()
        .enumerate()
        .filter_map(|(position, media_type)| {
            quality(&ranges, media_type).map(|(q, index)| (q, index, position, *media_type))
        })
        .collect();
    candidates.sort_by(|a, b| {
        b.0.total_cmp(&a.0)
            .then(a.1.cmp(&b.1))
            .then(a.2.cmp(&b.2))
    });
    candidates.first().map(|(_, _, _, media_type)| *media_type)
}

/// Concrete media types named by the header, most preferred first.
pub fn ordered_media_types(accept: Option<&str>) -> Vec<String> {
    let mut ranges: Vec<(usize, MediaRange)> = parse_accept(accept)
        .into_iter()
        .enumerate()
        .filter(|(_, range)| range.is_concrete() && range.q > 0.0)
        .collect();
    ranges.sort_by(|(ia, a), (ib, b)| b.q.total_cmp(&a.q).then(ia.cmp(ib)));
    ranges
        .into_iter()
        .map(|(_, range)| range.media_type())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_accept_accepts_everything() {
        assert!(accepts(None, "text/html"));
        assert_eq!(preferred(None, &["text/plain", "text/html"]), Some("text/plain"));
    }

    #[test]
    fn exact_type_is_required_without_wildcards() {
        assert!(!accepts(Some("application/ld+json"), "text/html"));
        assert!(accepts(Some("application/ld+json, text/*;q=0.1"), "text/html"));
    }

    #[test]
    fn q_zero_excludes() {
        assert!(!accepts(Some("text/html;q=0, */*"), "text/html"));
        assert!(accepts(Some("text/html;q=0, */*"), "text/plain"));
    }

    #[test]
    fn preferred_orders_by_quality() {
        let accept = Some("text/plain;q=0.5, text/turtle");
        assert_eq!(
            preferred(accept, &["text/plain", "text/turtle"]),
            Some("text/turtle")
        );
        assert_eq!(preferred(Some("image/png"), &["text/plain"]), None);
    }

    #[test]
    fn ordered_media_types_skip_wildcards() {
        assert_eq!(
            ordered_media_types(Some("*/*;q=0.1, text/html;q=0.8, application/json")),
            vec!["application/json".to_string(), "text/html".to_string()]
        );
    }
}
