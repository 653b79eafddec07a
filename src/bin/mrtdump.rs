/*!
`mrtdump` -- dump, filter and summarize MRT archives.

One worker task handles one file; parallel mode dispatches the work list
onto a thread pool. The dump, log and statistics sinks are shared across
workers and serialized behind locks, one write per record.
*/
use chrono::DateTime;
use clap::Parser;
use itertools::Itertools;
use mrtdump::filter::{
    prefix_key, AsnFilter, AsnPosition, Filter, FilterConfig, Filterable, PrefixTree,
};
use mrtdump::models::*;
use mrtdump::{MrtParser, ParserError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// RIB archives carry records well past the 1 MiB scanner default.
const DUMP_MAX_RECORD_SIZE: usize = 16 << 20;

#[derive(Parser)]
#[command(name = "mrtdump", version, about = "MRT/BGP archive dump utility")]
struct Cli {
    /// MRT files to dump, local paths (.bz2/.gz decompressed transparently)
    files: Vec<String>,

    /// File to dump entries to, or "stdout"
    #[arg(short = 'o', long = "dump-out", default_value = "stdout")]
    dump_out: String,

    /// File to dump log output to, or "stdout"
    #[arg(long = "log-out", default_value = "stdout")]
    log_out: String,

    /// File to dump statistics to, or "stdout"
    #[arg(long = "stat-out", default_value = "stdout")]
    stat_out: String,

    /// Dump files in parallel; output from distinct files may interleave
    #[arg(short = 'p', long)]
    parallel: bool,

    /// Print the output as JSON objects
    #[arg(long)]
    json: bool,

    /// Print every advertised prefix only once
    #[arg(long)]
    pup: bool,

    /// Like --pup, but as a time series including withdrawals
    #[arg(long)]
    pts: bool,

    /// Comma separated AS numbers to filter message sources by
    #[arg(long)]
    src: Option<String>,

    /// Comma separated AS numbers to filter message destinations by
    #[arg(long)]
    dest: Option<String>,

    /// JSON filter-configuration file (MonitoredPrefixes, SourceASes, ...)
    #[arg(long)]
    filters: Option<String>,

    /// Batch mode: "<collector-format-file>,<dump-config-file>"
    #[arg(long)]
    conf: Option<String>,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("mrtdump: {e}");
        std::process::exit(1);
    }
}

fn run(mut cli: Cli) -> Result<(), ParserError> {
    let mut files = std::mem::take(&mut cli.files);
    if files.is_empty() {
        let conf = cli.conf.take().ok_or_else(|| {
            ParserError::ParseError(
                "no MRT files provided and no --conf batch configuration".to_string(),
            )
        })?;
        let (collector_format, dump_config) = conf.split_once(',').ok_or_else(|| {
            ParserError::ParseError(
                "--conf wants <collector-format-file>,<dump-config-file>".to_string(),
            )
        })?;
        let dump_list = DumpList::load(dump_config)?;
        dump_list.apply_output_options(&mut cli);
        files = dump_list.expand(collector_format)?;
    }

    let dump = MultiWriter::open(&cli.dump_out)?;
    let log = MultiWriter::open(&cli.log_out)?;
    let stats = MultiWriter::open(&cli.stat_out)?;

    let mut filters: Vec<Filter> = Vec::new();
    if let Some(list) = &cli.src {
        filters.push(Filter::Asn(AsnFilter::from_list(list, AsnPosition::Source)?));
    }
    if let Some(list) = &cli.dest {
        filters.push(Filter::Asn(AsnFilter::from_list(
            list,
            AsnPosition::Destination,
        )?));
    }
    if let Some(path) = &cli.filters {
        filters.extend(FilterConfig::load(path)?.build_filters()?);
    }
    let filters = Arc::new(filters);

    let formatter: Arc<dyn Formatter> = if cli.json {
        Arc::new(JsonFormatter)
    } else if cli.pup || cli.pts {
        Arc::new(UniquePrefixFormatter::new(cli.pts))
    } else {
        Arc::new(TextFormatter)
    };

    stats.write_line(&format!("Dumping {} files", files.len()));
    let start = Instant::now();

    let work: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(files));
    if cli.parallel {
        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        std::thread::scope(|scope| {
            for _ in 0..workers {
                let work = Arc::clone(&work);
                let filters = Arc::clone(&filters);
                let formatter = Arc::clone(&formatter);
                let (dump, log, stats) = (dump.clone(), log.clone(), stats.clone());
                scope.spawn(move || {
                    while let Some(name) = pop_work(&work) {
                        dump_file(&name, formatter.as_ref(), &filters, &dump, &log, &stats);
                    }
                });
            }
        });
    } else {
        while let Some(name) = pop_work(&work) {
            dump_file(&name, formatter.as_ref(), &filters, &dump, &log, &stats);
        }
    }

    formatter.summarize(&dump);
    stats.write_line(&format!("Total time taken: {:?}", start.elapsed()));
    Ok(())
}

fn pop_work(work: &Mutex<Vec<String>>) -> Option<String> {
    let mut queue = work.lock().unwrap();
    queue.pop()
}

/// Parse one file, filter its records, and hand formatted output to the
/// dump sink. Decode errors are logged with the record number and file
/// name; they do not abort the rest of the file.
fn dump_file(
    name: &str,
    formatter: &dyn Formatter,
    filters: &[Filter],
    dump: &MultiWriter,
    log: &MultiWriter,
    stats: &MultiWriter,
) {
    let parser = match MrtParser::open_with_max_token_size(name, DUMP_MAX_RECORD_SIZE) {
        Ok(parser) => parser,
        Err(e) => {
            log.write_line(&format!("Error opening file {name}: {e}"));
            return;
        }
    };

    let start = Instant::now();
    let mut entries: u64 = 0;
    let mut passed: u64 = 0;

    for result in parser.into_fallible_record_iter() {
        entries += 1;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                log.write_line(&format!("[{entries}] Error in {name}: {e}"));
                continue;
            }
        };

        if !record.match_filters(filters) {
            continue;
        }
        passed += 1;
        if let Some(output) = formatter.format(entries, &record) {
            dump.write_str(&output);
        }
    }

    stats.write_line(&format!(
        "Scanned {name}: {entries} entries, {passed} passed filters in {:?}",
        start.elapsed()
    ));
}

/// A shared output sink. Writes lock per call, so lines from distinct
/// workers interleave at line granularity only.
#[derive(Clone)]
struct MultiWriter {
    inner: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl MultiWriter {
    fn open(target: &str) -> Result<Self, ParserError> {
        let writer: Box<dyn Write + Send> = match target {
            "stdout" => Box::new(std::io::stdout()),
            path => Box::new(File::create(path)?),
        };
        Ok(MultiWriter {
            inner: Arc::new(Mutex::new(writer)),
        })
    }

    fn write_str(&self, s: &str) {
        let mut writer = self.inner.lock().unwrap();
        let _ = writer.write_all(s.as_bytes());
    }

    fn write_line(&self, s: &str) {
        self.write_str(&format!("{s}\n"));
    }
}

trait Formatter: Send + Sync {
    /// Render one record, or return `None` when the formatter only
    /// aggregates (see [UniquePrefixFormatter]).
    fn format(&self, record_number: u64, record: &MrtRecord) -> Option<String>;
    fn summarize(&self, dump: &MultiWriter) {
        let _ = dump;
    }
}

struct TextFormatter;

impl Formatter for TextFormatter {
    fn format(&self, record_number: u64, record: &MrtRecord) -> Option<String> {
        let header = &record.common_header;
        let timestamp = DateTime::from_timestamp(header.timestamp as i64, 0)
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| header.timestamp.to_string());

        let mut out = format!(
            "[{record_number}] MRT Header: Timestamp:{timestamp} Type:{:?} Subtype:{} Len:{}\n",
            header.entry_type, header.entry_subtype, header.length
        );

        match &record.message {
            MrtMessage::Bgp4Mp(msg) => {
                out += &format!(
                    "BGP4MP Header: peer_as:{} local_as:{} peer_ip:{} local_ip:{}\n",
                    msg.peer_asn, msg.local_asn, msg.peer_ip, msg.local_ip
                );
                out += &format_update(&msg.update);
            }
            MrtMessage::TableDumpV2(TableDumpV2Message::PeerIndexTable(table)) => {
                out += &format!("Peer Index Table: {} peers\n", table.peers.len());
                for peer in &table.peers {
                    out += &format!("  {} AS{}\n", peer.peer_ip, peer.peer_asn);
                }
            }
            MrtMessage::TableDumpV2(TableDumpV2Message::RibAfiEntries(rib)) => {
                out += &format!(
                    "RIB: prefix {} with {} entries\n",
                    rib.prefix,
                    rib.rib_entries.len()
                );
                for entry in &rib.rib_entries {
                    let originated = DateTime::from_timestamp(entry.originated_time as i64, 0)
                        .map(|t| t.to_rfc3339())
                        .unwrap_or_default();
                    out += &format!(
                        "  peer_index:{} originated:{} path:{}\n",
                        entry.peer_index, originated, entry.attributes.as_path
                    );
                }
            }
        }
        out.push('\n');
        Some(out)
    }
}

fn format_update(update: &BgpUpdateMessage) -> String {
    let mut out = String::new();
    if !update.withdrawn_prefixes.is_empty() {
        out += &format!(
            "Withdrawn Routes ({}):\n{}\n",
            update.withdrawn_prefixes.len(),
            update.withdrawn_prefixes.iter().join("\n")
        );
    }
    if !update.announced_prefixes.is_empty() {
        out += &format!(
            "Advertised Routes ({}):\n{}\n",
            update.announced_prefixes.len(),
            update.announced_prefixes.iter().join("\n")
        );
    }

    let attributes = &update.attributes;
    if !attributes.as_path.is_empty() {
        out += &format!("AS-Path: {}\n", attributes.as_path);
    }
    if let Some(next_hop) = &attributes.next_hop {
        out += &format!("Next-Hop: {next_hop}\n");
    }
    if attributes.atomic_aggregate {
        out += "Atomic-Aggregate: true\n";
    }
    if let Some(aggregator) = &attributes.aggregator {
        out += &format!("Aggregator: AS:{} IP:{}\n", aggregator.asn, aggregator.ip);
    }
    if !attributes.communities.is_empty() {
        out += &format!(
            "Communities: {}\n",
            attributes.communities.iter().join(" ")
        );
    }
    if let Some(error) = &update.attr_error {
        out += &format!("Attribute-Error: {error}\n");
    }
    out
}

struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format(&self, _record_number: u64, record: &MrtRecord) -> Option<String> {
        match serde_json::to_string(record) {
            Ok(json) => Some(json + "\n"),
            Err(e) => {
                log::warn!("error marshaling record to JSON: {e}");
                None
            }
        }
    }
}

/// One prefix sighting: when, and whether it was an announcement.
#[derive(Debug, Clone, Serialize)]
struct PrefixEvent {
    timestamp: u32,
    advertised: bool,
}

#[derive(Debug, Clone, Serialize)]
struct PrefixHistory {
    prefix: String,
    events: Vec<PrefixEvent>,
}

/// Collects every advertised (and for time series, withdrawn) prefix and
/// emits each top-level prefix once at the end; prefixes contained in an
/// emitted parent are suppressed via the radix tree walk.
struct UniquePrefixFormatter {
    prefixes: Mutex<HashMap<String, PrefixHistory>>,
    time_series: bool,
}

impl UniquePrefixFormatter {
    fn new(time_series: bool) -> Self {
        UniquePrefixFormatter {
            prefixes: Mutex::new(HashMap::new()),
            time_series,
        }
    }

    fn add_prefixes(&self, prefixes: &[NetworkPrefix], timestamp: u32, advertised: bool) {
        let mut map = self.prefixes.lock().unwrap();
        for prefix in prefixes {
            let key = prefix_key(prefix);
            match map.get_mut(&key) {
                None => {
                    map.insert(
                        key,
                        PrefixHistory {
                            prefix: prefix.to_string(),
                            events: vec![PrefixEvent {
                                timestamp,
                                advertised,
                            }],
                        },
                    );
                }
                Some(history) => {
                    if self.time_series {
                        history.events.push(PrefixEvent {
                            timestamp,
                            advertised,
                        });
                    }
                }
            }
        }
    }
}

impl Formatter for UniquePrefixFormatter {
    fn format(&self, _record_number: u64, record: &MrtRecord) -> Option<String> {
        let timestamp = record.common_header.timestamp;
        self.add_prefixes(&record.advertised_prefixes(), timestamp, true);
        if self.time_series {
            self.add_prefixes(&record.withdrawn_prefixes(), timestamp, false);
        }
        None
    }

    fn summarize(&self, dump: &MultiWriter) {
        let map = self.prefixes.lock().unwrap();

        let mut tree = PrefixTree::new();
        for key in map.keys() {
            tree.insert_key(key);
        }

        for key in tree.top_level_keys() {
            let history = &map[&key];
            if self.time_series {
                match serde_json::to_string(history) {
                    Ok(json) => dump.write_line(&json),
                    Err(e) => log::warn!("error marshaling prefix history: {e}"),
                }
            } else {
                let first = &history.events[0];
                dump.write_line(&format!("{} {}", history.prefix, first.timestamp));
            }
        }
    }
}

/// Batch dump configuration: a set of collectors and a month range that
/// expand into directories of archive files.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DumpList {
    #[serde(rename = "ColList")]
    col_list: Vec<String>,
    #[serde(rename = "Start")]
    start: String,
    #[serde(rename = "End")]
    end: String,
    #[serde(rename = "Ofmt")]
    ofmt: String,
    #[serde(rename = "StFd")]
    st_fd: String,
    #[serde(rename = "DFd")]
    d_fd: String,
    #[serde(rename = "LFd")]
    l_fd: String,
    #[serde(rename = "SrcList")]
    src_list: String,
    #[serde(rename = "DstList")]
    dst_list: String,
}

impl DumpList {
    fn load(path: &str) -> Result<Self, ParserError> {
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .map_err(|e| ParserError::ParseError(format!("dump config: {e}")))
    }

    /// Batch configuration overrides the flag-level output options.
    fn apply_output_options(&self, cli: &mut Cli) {
        match self.ofmt.as_str() {
            "json" => cli.json = true,
            "pup" => cli.pup = true,
            "pts" => cli.pts = true,
            _ => {}
        }
        if !self.d_fd.is_empty() {
            cli.dump_out = self.d_fd.clone();
        }
        if !self.st_fd.is_empty() {
            cli.stat_out = self.st_fd.clone();
        }
        if !self.l_fd.is_empty() {
            cli.log_out = self.l_fd.clone();
        }
        if !self.src_list.is_empty() {
            cli.src = Some(self.src_list.clone());
        }
        if !self.dst_list.is_empty() {
            cli.dest = Some(self.dst_list.clone());
        }
    }

    /// Expand the collector list and month range into the files under each
    /// matching directory.
    fn expand(&self, collector_format: &str) -> Result<Vec<String>, ParserError> {
        let formats = parse_collector_format(collector_format)?;
        let months = month_range(&self.start, &self.end)?;

        let mut paths = Vec::new();
        for month in &months {
            for collector in &self.col_list {
                let path = match formats.get(collector) {
                    Some(path) => path.clone(),
                    None => formats
                        .get("_default")
                        .cloned()
                        .unwrap_or_default()
                        .replace("{x}", collector),
                };
                paths.push(path.replace("{yyyy.mm}", month));
            }
        }

        let mut files = Vec::new();
        for dir in paths {
            let entries = std::fs::read_dir(&dir)?;
            for entry in entries {
                let entry = entry?;
                let name = entry.file_name().to_string_lossy().to_string();
                if name.starts_with('.') {
                    continue;
                }
                files.push(entry.path().display().to_string());
            }
        }
        files.sort();
        Ok(files)
    }
}

/// Inclusive list of "yyyy.mm" strings from start to end.
fn month_range(start: &str, end: &str) -> Result<Vec<String>, ParserError> {
    let parse = |s: &str| -> Result<(i32, u32), ParserError> {
        let (year, month) = s.split_once('.').ok_or_else(|| {
            ParserError::ParseError(format!("bad month {s}, want yyyy.mm"))
        })?;
        let year: i32 = year
            .parse()
            .map_err(|_| ParserError::ParseError(format!("bad year in {s}")))?;
        let month: u32 = month
            .parse()
            .map_err(|_| ParserError::ParseError(format!("bad month in {s}")))?;
        if !(1..=12).contains(&month) {
            return Err(ParserError::ParseError(format!("bad month in {s}")));
        }
        Ok((year, month))
    };

    let (mut year, mut month) = parse(start)?;
    let (end_year, end_month) = parse(end)?;

    let mut months = Vec::new();
    while (year, month) <= (end_year, end_month) {
        months.push(format!("{year:04}.{month:02}"));
        month += 1;
        if month > 12 {
            month = 1;
            year += 1;
        }
    }
    Ok(months)
}

/// Parse the collector-format file: a `{base}` line, a `{default}` line
/// with a `{x}` collector placeholder, then optional per-collector lines.
fn parse_collector_format(path: &str) -> Result<HashMap<String, String>, ParserError> {
    let file = BufReader::new(File::open(path)?);
    let mut lines = file.lines();

    let mut formats = HashMap::new();
    let base = match lines.next() {
        Some(line) => {
            let line = line?;
            let (tag, value) = read_pair(&line)?;
            if tag != "{base}" {
                return Err(ParserError::ParseError(
                    "collector format file must start with a {base} line".to_string(),
                ));
            }
            value.to_string()
        }
        None => {
            return Err(ParserError::ParseError(
                "empty collector format file".to_string(),
            ))
        }
    };

    match lines.next() {
        Some(line) => {
            let line = line?;
            let (tag, value) = read_pair(&line)?;
            if tag != "{default}" {
                return Err(ParserError::ParseError(
                    "collector format file must carry a {default} line".to_string(),
                ));
            }
            formats.insert("_default".to_string(), format!("{base}{value}"));
        }
        None => {
            return Err(ParserError::ParseError(
                "collector format file missing the {default} line".to_string(),
            ))
        }
    }

    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let (name, value) = read_pair(&line)?;
        formats.insert(name.to_string(), format!("{base}{value}"));
    }

    Ok(formats)
}

fn read_pair(line: &str) -> Result<(&str, &str), ParserError> {
    line.trim_end()
        .split_once(' ')
        .ok_or_else(|| ParserError::ParseError(format!("badly formatted line: {line}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_range() {
        assert_eq!(
            month_range("2021.11", "2022.02").unwrap(),
            vec!["2021.11", "2021.12", "2022.01", "2022.02"]
        );
        assert_eq!(month_range("2022.05", "2022.05").unwrap(), vec!["2022.05"]);
        assert!(month_range("2022.13", "2023.01").is_err());
        assert!(month_range("garbage", "2023.01").is_err());
    }

    #[test]
    fn test_parse_collector_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("collectors.txt");
        std::fs::write(
            &path,
            "{base} /archive/\n{default} {x}/{yyyy.mm}/UPDATES/\nroute-views2 rv2/{yyyy.mm}/\n",
        )
        .unwrap();

        let formats = parse_collector_format(path.to_str().unwrap()).unwrap();
        assert_eq!(formats["_default"], "/archive/{x}/{yyyy.mm}/UPDATES/");
        assert_eq!(formats["route-views2"], "/archive/rv2/{yyyy.mm}/");
    }
}
