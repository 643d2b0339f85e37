use std::fmt;

use serde_derive::Deserialize;
use thiserror::Error;

const ZONE_ID: &str = "<ZONE_ID>";
const DNS_RECORD_ID: &str = "<DNS_RECORD_ID>";

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(Box<str>),
    ZoneId,
    DnsRecordId,
}

/// A record endpoint URL with named holes for the zone and the record id,
/// e.g. `https://api.cloudflare.com/client/v4/zones/<ZONE_ID>/dns_records/<DNS_RECORD_ID>`.
///
/// The template is split into segments once, when the host list is loaded,
/// so rendering never has to search the text again.
#[derive(Deserialize, Clone, PartialEq, Eq)]
#[serde(try_from = "String")]
pub struct EndpointTemplate {
    segments: Vec<Segment>,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("endpoint template must contain both <ZONE_ID> and <DNS_RECORD_ID>: {0}")]
pub struct TemplateError(Box<str>);

impl EndpointTemplate {
    pub fn parse(template: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut rest = template;

        loop {
            let zone = rest.find(ZONE_ID).map(|at| (at, ZONE_ID, Segment::ZoneId));
            let record = rest
                .find(DNS_RECORD_ID)
                .map(|at| (at, DNS_RECORD_ID, Segment::DnsRecordId));

            let next = match (zone, record) {
                (Some(z), Some(r)) => Some(if z.0 < r.0 { z } else { r }),
                (z, r) => z.or(r),
            };

            let Some((at, token, segment)) = next else {
                if !rest.is_empty() {
                    segments.push(Segment::Literal(rest.into()));
                }
                break;
            };

            if at > 0 {
                segments.push(Segment::Literal(rest[..at].into()));
            }
            segments.push(segment);
            rest = &rest[at + token.len()..];
        }

        let has_zone = segments.contains(&Segment::ZoneId);
        let has_record = segments.contains(&Segment::DnsRecordId);
        if !(has_zone && has_record) {
            return Err(TemplateError(template.into()));
        }

        Ok(Self { segments })
    }

    pub fn render(&self, zone_id: &str, dns_record_id: &str) -> String {
        let mut url = String::new();
        for segment in &self.segments {
            url += match segment {
                Segment::Literal(text) => text.as_ref(),
                Segment::ZoneId => zone_id,
                Segment::DnsRecordId => dns_record_id,
            };
        }
        url
    }
}

impl TryFrom<String> for EndpointTemplate {
    type Error = TemplateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl fmt::Display for EndpointTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => f.write_str(text)?,
                Segment::ZoneId => f.write_str(ZONE_ID)?,
                Segment::DnsRecordId => f.write_str(DNS_RECORD_ID)?,
            }
        }
        Ok(())
    }
}

impl fmt::Debug for EndpointTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLOUDFLARE: &str =
        "https://api.cloudflare.com/client/v4/zones/<ZONE_ID>/dns_records/<DNS_RECORD_ID>";

    #[test]
    fn renders_named_fields() {
        let template = EndpointTemplate::parse(CLOUDFLARE).unwrap();
        assert_eq!(
            template.render("023e105f4ecef8ad9ca31a8372d0c353", "372e67954025e0ba6aaa6d586b9e0b59"),
            "https://api.cloudflare.com/client/v4/zones/023e105f4ecef8ad9ca31a8372d0c353\
             /dns_records/372e67954025e0ba6aaa6d586b9e0b59"
        );
    }

    #[test]
    fn placeholders_in_any_order() {
        let template = EndpointTemplate::parse("http://x/<DNS_RECORD_ID>?zone=<ZONE_ID>").unwrap();
        assert_eq!(template.render("z", "r"), "http://x/r?zone=z");
    }

    #[test]
    fn repeated_placeholders_are_all_replaced() {
        let template = EndpointTemplate::parse("<ZONE_ID>/<DNS_RECORD_ID>/<ZONE_ID>").unwrap();
        assert_eq!(template.render("z", "r"), "z/r/z");
    }

    #[test]
    fn values_are_not_rescanned() {
        // A zone id that looks like a placeholder must be inserted verbatim.
        let template = EndpointTemplate::parse(CLOUDFLARE).unwrap();
        let url = template.render("<DNS_RECORD_ID>", "r");
        assert!(url.ends_with("/zones/<DNS_RECORD_ID>/dns_records/r"));
    }

    #[test]
    fn missing_placeholder_is_rejected() {
        assert!(EndpointTemplate::parse("https://x/<ZONE_ID>").is_err());
        assert!(EndpointTemplate::parse("https://x/<DNS_RECORD_ID>").is_err());
        assert!(EndpointTemplate::parse("").is_err());
    }

    #[test]
    fn display_gives_back_the_template() {
        let template = EndpointTemplate::parse(CLOUDFLARE).unwrap();
        assert_eq!(template.to_string(), CLOUDFLARE);
    }
}
