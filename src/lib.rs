/*!
`mrtdump` parses Multi-Threaded Routing Toolkit (MRT) archives of BGP
updates and RIB dumps into strongly-typed messages, filters them with
predicate combinators, and reads/writes a length-prefixed record-file
container for downstream storage.

# Parsing an archive

```no_run
use mrtdump::MrtParser;

let parser = MrtParser::open("updates.20211001.0000.bz2").unwrap();
for record in parser {
    println!("{:?}", record.common_header);
}
```

bzip2 (`.bz2`) and gzip (`.gz`) archives are decompressed transparently
based on the filename suffix.

# Filtering

```no_run
use mrtdump::filter::{AsnFilter, AsnPosition, Filter, PrefixFilter, PrefixPosition};
use mrtdump::MrtParser;

let parser = MrtParser::open("updates.mrt")
    .unwrap()
    .add_filter(Filter::Prefix(
        PrefixFilter::new(&["211.98.251.0/24"], PrefixPosition::Any).unwrap(),
    ))
    .add_filter(Filter::Asn(AsnFilter::new(vec![3356], AsnPosition::Source)));

for record in parser {
    println!("{} matching prefixes", record.advertised_prefixes().len());
}
```

Filters compose by conjunction and evaluate over both update archives and
TABLE_DUMP_V2 RIB snapshots; prefix membership uses longest-prefix-match
over a radix tree.

# Error handling

Records that fail to decode do not terminate the stream. Use
[MrtParser::into_fallible_record_iter] to see per-record errors, or the
plain iterator to have them logged and skipped.

# Record files

The [records] module implements the storage container used by downstream
tooling: length-prefixed blobs with an optional self-describing JSON footer
(entry count, section offsets) that supports append with footer rewrite.
*/
pub mod error;
pub mod filter;
pub mod models;
pub mod parser;
pub mod records;

mod io;

pub use error::ParserError;
pub use models::MrtRecord;
pub use parser::MrtParser;
