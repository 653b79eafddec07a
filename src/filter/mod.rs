/*!
## Record filters

Composable predicates over decoded MRT records. A record passes when every
configured filter accepts it (conjunction). Filters never error on decoded
input: anything a predicate cannot evaluate rejects with `false`.

Two built-in filter families exist:

- [PrefixFilter]: accepts a record when any prefix on the selected side
  (advertised, withdrawn, or either) is contained in one of the configured
  prefixes, via longest-prefix-match over the [PrefixTree].
- [AsnFilter]: accepts when the collapsed AS path carries one of the
  configured AS numbers at the selected position. The last ASN of the
  collapsed path is the source (origin) by convention and the first is the
  destination.

[FilterConfig] materializes the consumer-facing JSON configuration object
into a filter list.
*/
mod prefix_tree;

pub use prefix_tree::{ip_prefix_key, prefix_key, PrefixTree};

use crate::error::ParserError;
use crate::models::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which side of an update a prefix filter inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixPosition {
    Advertised,
    Withdrawn,
    Any,
}

/// Which position of the collapsed AS path an ASN filter inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsnPosition {
    /// Rightmost hop of the collapsed path: the origin of the route.
    Source,
    /// Leftmost hop of the collapsed path.
    Destination,
    /// Strictly between the first and last hop; needs a path of length 3+.
    MidPath,
    Anywhere,
}

/// Prefix membership filter backed by a radix tree.
pub struct PrefixFilter {
    tree: PrefixTree,
    position: PrefixPosition,
}

impl PrefixFilter {
    /// Build from `"a.b.c.d/m"` / `"x:y::/m"` strings. A malformed string
    /// fails construction with [ParserError::PrefixConfig]; this never
    /// happens during streaming.
    pub fn new<S: AsRef<str>>(
        prefixes: &[S],
        position: PrefixPosition,
    ) -> Result<Self, ParserError> {
        let mut tree = PrefixTree::new();
        for raw in prefixes {
            let prefix = NetworkPrefix::from_str(raw.as_ref())?;
            tree.insert_prefix(&prefix);
        }
        Ok(PrefixFilter { tree, position })
    }

    pub fn from_prefixes(prefixes: &[NetworkPrefix], position: PrefixPosition) -> Self {
        let mut tree = PrefixTree::new();
        for prefix in prefixes {
            tree.insert_prefix(prefix);
        }
        PrefixFilter { tree, position }
    }

    fn matches(&self, record: &MrtRecord) -> bool {
        if matches!(
            self.position,
            PrefixPosition::Advertised | PrefixPosition::Any
        ) && record
            .advertised_prefixes()
            .iter()
            .any(|p| self.tree.contains_prefix(p))
        {
            return true;
        }

        if matches!(
            self.position,
            PrefixPosition::Withdrawn | PrefixPosition::Any
        ) && record
            .withdrawn_prefixes()
            .iter()
            .any(|p| self.tree.contains_prefix(p))
        {
            return true;
        }

        false
    }
}

/// AS number position filter.
pub struct AsnFilter {
    asns: Vec<u32>,
    position: AsnPosition,
}

impl AsnFilter {
    pub fn new(asns: Vec<u32>, position: AsnPosition) -> Self {
        AsnFilter { asns, position }
    }

    /// Parse a `"1,2,3"` list, the format the dump utility accepts.
    pub fn from_list(list: &str, position: AsnPosition) -> Result<Self, ParserError> {
        let asns = list
            .split(',')
            .map(|part| {
                part.trim()
                    .parse::<u32>()
                    .map_err(|e| ParserError::ParseError(format!("invalid AS number {part}: {e}")))
            })
            .collect::<Result<Vec<u32>, ParserError>>()?;
        Ok(AsnFilter::new(asns, position))
    }

    fn matches_one(&self, asn: u32) -> bool {
        self.asns.contains(&asn)
    }

    fn matches(&self, record: &MrtRecord) -> bool {
        let path = record.collapsed_as_path();
        if path.is_empty() {
            return false;
        }

        match self.position {
            AsnPosition::Source => self.matches_one(path[path.len() - 1]),
            AsnPosition::Destination => self.matches_one(path[0]),
            AsnPosition::MidPath => {
                if path.len() < 3 {
                    return false;
                }
                path[1..path.len() - 1].iter().any(|asn| self.matches_one(*asn))
            }
            AsnPosition::Anywhere => path.iter().any(|asn| self.matches_one(*asn)),
        }
    }
}

/// A single filter predicate.
pub enum Filter {
    Prefix(PrefixFilter),
    Asn(AsnFilter),
}

pub trait Filterable {
    fn match_filter(&self, filter: &Filter) -> bool;
    fn match_filters(&self, filters: &[Filter]) -> bool;
}

impl Filterable for MrtRecord {
    fn match_filter(&self, filter: &Filter) -> bool {
        match filter {
            Filter::Prefix(f) => f.matches(self),
            Filter::Asn(f) => f.matches(self),
        }
    }

    fn match_filters(&self, filters: &[Filter]) -> bool {
        filters.iter().all(|f| self.match_filter(f))
    }
}

impl MrtRecord {
    /// Prefixes this record advertises: the announced list of an update, or
    /// the prefix of a RIB subrecord. A peer-index table advertises nothing.
    pub fn advertised_prefixes(&self) -> Vec<NetworkPrefix> {
        match &self.message {
            MrtMessage::Bgp4Mp(msg) => msg.update.announced_prefixes.clone(),
            MrtMessage::TableDumpV2(TableDumpV2Message::RibAfiEntries(rib)) => {
                vec![rib.prefix]
            }
            MrtMessage::TableDumpV2(TableDumpV2Message::PeerIndexTable(_)) => vec![],
        }
    }

    /// Prefixes this record withdraws. RIB snapshots never withdraw.
    pub fn withdrawn_prefixes(&self) -> Vec<NetworkPrefix> {
        match &self.message {
            MrtMessage::Bgp4Mp(msg) => msg.update.withdrawn_prefixes.clone(),
            MrtMessage::TableDumpV2(_) => vec![],
        }
    }

    /// The collapsed AS path of an update, or the concatenation of every
    /// RIB entry's collapsed path for a RIB subrecord.
    pub fn collapsed_as_path(&self) -> Vec<u32> {
        match &self.message {
            MrtMessage::Bgp4Mp(msg) => msg.update.attributes.as_path.collapsed(),
            MrtMessage::TableDumpV2(TableDumpV2Message::RibAfiEntries(rib)) => rib
                .rib_entries
                .iter()
                .flat_map(|entry| entry.attributes.as_path.collapsed())
                .collect(),
            MrtMessage::TableDumpV2(TableDumpV2Message::PeerIndexTable(_)) => vec![],
        }
    }
}

/// The consumer-facing filter configuration object.
///
/// Absent or empty arrays contribute no filter: that dimension accepts
/// everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    #[serde(rename = "MonitoredPrefixes")]
    pub monitored_prefixes: Vec<String>,
    #[serde(rename = "SourceASes")]
    pub source_ases: Vec<u32>,
    #[serde(rename = "DestASes")]
    pub dest_ases: Vec<u32>,
    #[serde(rename = "MidPathASes")]
    pub mid_path_ases: Vec<u32>,
    #[serde(rename = "AnywhereASes")]
    pub anywhere_ases: Vec<u32>,
}

impl FilterConfig {
    pub fn from_json(contents: &str) -> Result<Self, ParserError> {
        serde_json::from_str(contents)
            .map_err(|e| ParserError::ParseError(format!("filter config: {e}")))
    }

    pub fn load(path: &str) -> Result<Self, ParserError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Materialize the configured dimensions into filters.
    pub fn build_filters(&self) -> Result<Vec<Filter>, ParserError> {
        let mut filters = Vec::new();
        if !self.monitored_prefixes.is_empty() {
            filters.push(Filter::Prefix(PrefixFilter::new(
                &self.monitored_prefixes,
                PrefixPosition::Advertised,
            )?));
        }
        if !self.source_ases.is_empty() {
            filters.push(Filter::Asn(AsnFilter::new(
                self.source_ases.clone(),
                AsnPosition::Source,
            )));
        }
        if !self.dest_ases.is_empty() {
            filters.push(Filter::Asn(AsnFilter::new(
                self.dest_ases.clone(),
                AsnPosition::Destination,
            )));
        }
        if !self.mid_path_ases.is_empty() {
            filters.push(Filter::Asn(AsnFilter::new(
                self.mid_path_ases.clone(),
                AsnPosition::MidPath,
            )));
        }
        if !self.anywhere_ases.is_empty() {
            filters.push(Filter::Asn(AsnFilter::new(
                self.anywhere_ases.clone(),
                AsnPosition::Anywhere,
            )));
        }
        Ok(filters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::IpAddr;
    use std::str::FromStr;

    fn update_record(
        announced: Vec<&str>,
        withdrawn: Vec<&str>,
        as_path: Vec<u32>,
    ) -> MrtRecord {
        let mut attributes = Attributes::default();
        if !as_path.is_empty() {
            attributes.as_path = AsPath::from_segments(vec![AsPathSegment::sequence(as_path)]);
        }
        let update = BgpUpdateMessage {
            withdrawn_prefixes: withdrawn
                .into_iter()
                .map(|p| NetworkPrefix::from_str(p).unwrap())
                .collect(),
            attributes,
            announced_prefixes: announced
                .into_iter()
                .map(|p| NetworkPrefix::from_str(p).unwrap())
                .collect(),
            attr_error: None,
        };
        MrtRecord {
            common_header: CommonHeader {
                timestamp: 0,
                microsecond_timestamp: None,
                entry_type: EntryType::BGP4MP,
                entry_subtype: 4,
                length: 0,
            },
            message: MrtMessage::Bgp4Mp(Bgp4MpMessage {
                msg_type: Bgp4MpType::MessageAs4,
                peer_asn: Asn::new_32bit(65000),
                local_asn: Asn::new_32bit(65001),
                interface_index: 0,
                address_family: Afi::Ipv4,
                peer_ip: IpAddr::from_str("10.0.0.1").unwrap(),
                local_ip: IpAddr::from_str("10.0.0.2").unwrap(),
                bgp_header: BgpHeader {
                    marker: [0xff; 16],
                    length: 0,
                    msg_type: BgpMessageType::Update,
                },
                update,
            }),
        }
    }

    #[test]
    fn test_asn_filter_positions() {
        let record = update_record(vec!["192.0.2.0/24"], vec![], vec![1, 2, 3, 4, 5]);

        let midpath = Filter::Asn(AsnFilter::new(vec![3], AsnPosition::MidPath));
        assert!(record.match_filter(&midpath));

        let source = Filter::Asn(AsnFilter::new(vec![3], AsnPosition::Source));
        assert!(!record.match_filter(&source));
        let source5 = Filter::Asn(AsnFilter::new(vec![5], AsnPosition::Source));
        assert!(record.match_filter(&source5));

        let dest = Filter::Asn(AsnFilter::new(vec![3], AsnPosition::Destination));
        assert!(!record.match_filter(&dest));
        let dest1 = Filter::Asn(AsnFilter::new(vec![1], AsnPosition::Destination));
        assert!(record.match_filter(&dest1));

        let anywhere = Filter::Asn(AsnFilter::new(vec![3], AsnPosition::Anywhere));
        assert!(record.match_filter(&anywhere));
    }

    #[test]
    fn test_asn_filter_short_paths() {
        let record = update_record(vec![], vec![], vec![7, 8]);
        // midpath needs at least three hops
        let midpath = Filter::Asn(AsnFilter::new(vec![7, 8], AsnPosition::MidPath));
        assert!(!record.match_filter(&midpath));

        let empty = update_record(vec![], vec![], vec![]);
        let anywhere = Filter::Asn(AsnFilter::new(vec![7], AsnPosition::Anywhere));
        assert!(!empty.match_filter(&anywhere));
    }

    #[test]
    fn test_prefix_filter_positions() {
        let record = update_record(
            vec!["192.0.2.128/25"],
            vec!["198.51.100.0/24"],
            vec![1, 2, 3],
        );

        let advertised = Filter::Prefix(
            PrefixFilter::new(&["192.0.2.0/24"], PrefixPosition::Advertised).unwrap(),
        );
        assert!(record.match_filter(&advertised));

        let withdrawn = Filter::Prefix(
            PrefixFilter::new(&["192.0.2.0/24"], PrefixPosition::Withdrawn).unwrap(),
        );
        assert!(!record.match_filter(&withdrawn));

        let any =
            Filter::Prefix(PrefixFilter::new(&["198.51.100.0/24"], PrefixPosition::Any).unwrap());
        assert!(record.match_filter(&any));
    }

    #[test]
    fn test_filter_conjunction() {
        let record = update_record(vec!["192.0.2.0/24"], vec![], vec![1, 2, 3]);
        let filters = vec![
            Filter::Prefix(PrefixFilter::new(&["192.0.2.0/24"], PrefixPosition::Any).unwrap()),
            Filter::Asn(AsnFilter::new(vec![3], AsnPosition::Source)),
        ];
        assert!(record.match_filters(&filters));

        let filters = vec![
            Filter::Prefix(PrefixFilter::new(&["192.0.2.0/24"], PrefixPosition::Any).unwrap()),
            Filter::Asn(AsnFilter::new(vec![9], AsnPosition::Source)),
        ];
        assert!(!record.match_filters(&filters));
        assert!(record.match_filters(&[]));
    }

    #[test]
    fn test_filters_are_pure() {
        let record = update_record(vec!["192.0.2.0/24"], vec![], vec![1, 2, 3]);
        let filter = Filter::Asn(AsnFilter::new(vec![3], AsnPosition::Anywhere));
        assert_eq!(record.match_filter(&filter), record.match_filter(&filter));
    }

    #[test]
    fn test_bad_prefix_string() {
        let result = PrefixFilter::new(&["not-a-prefix"], PrefixPosition::Any);
        assert!(matches!(result, Err(ParserError::PrefixConfig(_))));
    }

    #[test]
    fn test_bad_asn_list() {
        assert!(AsnFilter::from_list("1,2,x", AsnPosition::Source).is_err());
        let filter = AsnFilter::from_list("1, 2,3", AsnPosition::Source).unwrap();
        assert_eq!(filter.asns, vec![1, 2, 3]);
    }

    #[test]
    fn test_filter_config() {
        let json = r#"{
            "MonitoredPrefixes": ["192.0.2.0/24"],
            "SourceASes": [65000],
            "MidPathASes": [3356]
        }"#;
        let config = FilterConfig::from_json(json).unwrap();
        assert_eq!(config.monitored_prefixes, vec!["192.0.2.0/24"]);
        assert_eq!(config.source_ases, vec![65000]);
        assert!(config.dest_ases.is_empty());

        let filters = config.build_filters().unwrap();
        assert_eq!(filters.len(), 3);

        // empty config builds no filters: accept-all
        let filters = FilterConfig::default().build_filters().unwrap();
        assert!(filters.is_empty());
    }

    #[test]
    fn test_filter_config_bad_prefix_fails_at_construction() {
        let config = FilterConfig {
            monitored_prefixes: vec!["500.1.2.3/99".to_string()],
            ..Default::default()
        };
        assert!(config.build_filters().is_err());
    }
}
