//! Summary file output
//!
//! One header line, then one row per document number:
//! key, record count, and sum/avg/max/min for every tracked column, all
//! amounts with two decimals.

use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::fs::File;
use std::io::{self, BufWriter, Write};

use crate::aggregate::Aggregate;
use crate::config::{OutputTarget, ValueProfile};
use crate::error::PipelineError;
use crate::merge::coalesce_sorted;

/// Open the configured output for writing, truncating an existing file
pub fn open_output(target: &OutputTarget) -> io::Result<Box<dyn Write>> {
    Ok(match target {
        OutputTarget::Stdout => Box::new(BufWriter::new(io::stdout())),
        OutputTarget::File(path) => Box::new(BufWriter::new(File::create(path)?)),
    })
}

/// Header fields for a profile
pub fn header_fields(profile: ValueProfile) -> Vec<String> {
    let mut fields = vec!["DOCUMENT_NUMBER".to_string(), "AMOUNT_RECORDS".to_string()];
    for column in profile.columns() {
        for stat in ["SUM", "AVG", "MAX", "MIN"] {
            fields.push(format!("{}_{}", stat, column.label()));
        }
    }
    fields
}

/// Row fields for one final aggregate
pub fn row_fields(aggregate: &Aggregate) -> Vec<String> {
    let mut fields = Vec::with_capacity(2 + aggregate.values.len() * 4);
    fields.push(aggregate.key.to_string());
    fields.push(aggregate.count.to_string());
    for (column, stats) in aggregate.values.iter().enumerate() {
        fields.push(format!("{:.2}", stats.sum));
        fields.push(format!("{:.2}", aggregate.average(column)));
        fields.push(format!("{:.2}", stats.max));
        fields.push(format!("{:.2}", stats.min));
    }
    fields
}

/// Delimited summary writer. Fields are never quoted.
pub struct SummaryWriter<W: Write> {
    writer: csv::Writer<W>,
    profile: ValueProfile,
    rows: usize,
}

impl<W: Write> SummaryWriter<W> {
    pub fn new(inner: W, delimiter: u8, profile: ValueProfile) -> Self {
        let writer = WriterBuilder::new()
            .delimiter(delimiter)
            .quote_style(QuoteStyle::Never)
            .terminator(Terminator::Any(b'\n'))
            .has_headers(false)
            .from_writer(inner);
        Self {
            writer,
            profile,
            rows: 0,
        }
    }

    pub fn write_header(&mut self) -> Result<(), PipelineError> {
        self.writer.write_record(header_fields(self.profile))?;
        Ok(())
    }

    pub fn write_row(&mut self, aggregate: &Aggregate) -> Result<(), PipelineError> {
        self.writer.write_record(row_fields(aggregate))?;
        self.rows += 1;
        Ok(())
    }

    /// Rows written so far, header excluded
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn flush(&mut self) -> Result<(), PipelineError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Merge key-sorted partials and write one row per key. Returns the number
/// of rows written.
pub fn combine_and_write<W: Write>(
    sorted: Vec<Aggregate>,
    writer: &mut SummaryWriter<W>,
) -> Result<usize, PipelineError> {
    let before = writer.rows();
    for aggregate in coalesce_sorted(sorted) {
        writer.write_row(&aggregate)?;
    }
    Ok(writer.rows() - before)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;

    fn render(profile: ValueProfile, delimiter: u8, aggregates: Vec<Aggregate>) -> String {
        let mut buf = Vec::new();
        {
            let mut writer = SummaryWriter::new(&mut buf, delimiter, profile);
            writer.write_header().unwrap();
            combine_and_write(aggregates, &mut writer).unwrap();
            writer.flush().unwrap();
        }
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_stock_header() {
        let header = header_fields(ValueProfile::Stock).join(";");
        assert_eq!(
            header,
            "DOCUMENT_NUMBER;AMOUNT_RECORDS;\
             SUM_NOMINAL_VALUE;AVG_NOMINAL_VALUE;MAX_NOMINAL_VALUE;MIN_NOMINAL_VALUE;\
             SUM_PRESENT_VALUE;AVG_PRESENT_VALUE;MAX_PRESENT_VALUE;MIN_PRESENT_VALUE;\
             SUM_ACQUISITION_VALUE;AVG_ACQUISITION_VALUE;MAX_ACQUISITION_VALUE;MIN_ACQUISITION_VALUE"
        );
    }

    #[test]
    fn test_rows_have_two_decimals() {
        let mut agg = Aggregate::from_record(&Record::new(123, &[100.0]));
        agg.add_record(&Record::new(123, &[50.0]));
        agg.add_record(&Record::new(123, &[0.5]));

        let out = render(ValueProfile::Future, b';', vec![agg]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            vec![
                "DOCUMENT_NUMBER;AMOUNT_RECORDS;SUM_FUTURE_VALUE;AVG_FUTURE_VALUE;MAX_FUTURE_VALUE;MIN_FUTURE_VALUE",
                "123;3;150.50;50.17;100.00;0.50",
            ]
        );
        assert!(out.ends_with('\n'));
    }

    #[test]
    fn test_combine_merges_sorted_partials() {
        let partials = vec![
            Aggregate::from_record(&Record::new(1, &[1.0])),
            Aggregate::from_record(&Record::new(1, &[3.0])),
            Aggregate::from_record(&Record::new(2, &[2.0])),
        ];
        let out = render(ValueProfile::Future, b',', partials);
        let rows: Vec<&str> = out.lines().skip(1).collect();
        assert_eq!(rows, vec!["1,2,4.00,2.00,3.00,1.00", "2,1,2.00,2.00,2.00,2.00"]);
    }

    #[test]
    fn test_header_only_when_empty() {
        let out = render(ValueProfile::Stock, b';', Vec::new());
        assert_eq!(out.lines().count(), 1);
    }
}
