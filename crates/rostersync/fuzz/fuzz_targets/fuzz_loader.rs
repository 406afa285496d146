//! Fuzz target for the CSV loader.
//!
//! The loader must never panic: arbitrary bytes either load into a
//! rectangular table or fail with an error.

#![no_main]

use libfuzzer_sys::fuzz_target;
use rostersync::RosterSync;

fuzz_target!(|data: &[u8]| {
    if data.len() > 100_000 {
        return;
    }

    let sync = RosterSync::new();
    if let Ok((table, source)) = sync.load_bytes(data, None) {
        let cols = table.column_count();
        assert!(table.rows.iter().all(|row| row.len() == cols));

        // Inference and preview run over whatever loaded
        let analysis = sync.analyze_table(&table, source);
        assert_eq!(analysis.total_rows, table.row_count());
    }
});
