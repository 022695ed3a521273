//! VCF-like text output.
//!
//! Lines are rendered into `String` buffers so workers can batch them before
//! handing them to the single writer.

use std::io::{self, Write};

use crate::breakpoint::sample::SampleCatalog;
use crate::breakpoint::site::SiteCall;

pub const FORMAT_FIELDS: &str = "GT:GL:NB:NG:CL:DP";

const META: &[&str] = &[
    "##fileformat=VCFv4.1",
    "##INFO=<ID=LRT,Number=1,Type=Float,Description=\"Likelihood ratio test statistic, target versus background\">",
    "##INFO=<ID=AF,Number=3,Type=Float,Description=\"Alternate allele frequency in target, background, combined\">",
    "##INFO=<ID=GC,Number=2,Type=Integer,Description=\"Number of called genotypes in target, background\">",
    "##INFO=<ID=NALT,Number=2,Type=Integer,Description=\"Number of alternate pseudo alleles in target, background\">",
    "##INFO=<ID=CLUSTERS,Number=.,Type=String,Description=\"Clip clusters as 1-based position->supporting reads\">",
    "##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Pseudo genotype\">",
    "##FORMAT=<ID=GL,Number=G,Type=Float,Description=\"Genotype log likelihoods\">",
    "##FORMAT=<ID=NB,Number=1,Type=Integer,Description=\"Number of reads supporting a breakpoint\">",
    "##FORMAT=<ID=NG,Number=1,Type=Integer,Description=\"Number of reads supporting no breakpoint\">",
    "##FORMAT=<ID=CL,Number=1,Type=Integer,Description=\"Number of clipped bases\">",
    "##FORMAT=<ID=DP,Number=1,Type=Integer,Description=\"Number of reads passing filters\">",
];

pub fn write_header<W: Write>(writer: &mut W, samples: &SampleCatalog) -> io::Result<()> {
    for line in META {
        writeln!(writer, "{}", line)?;
    }
    write!(
        writer,
        "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT"
    )?;
    for sample in samples.iter() {
        write!(writer, "\t{}", sample.label())?;
    }
    writeln!(writer)
}

impl SiteCall {
    pub fn info_field(&self) -> String {
        let c = &self.cohort;
        let mut info = format!(
            "LRT={};AF={},{},{};GC={},{};NALT={},{}",
            c.lrt,
            c.target_af,
            c.background_af,
            c.combined_af,
            c.target.samples,
            c.background.samples,
            c.target.alt_alleles,
            c.background.alt_alleles
        );
        info.push_str(";CLUSTERS=");
        for (i, (coordinate, count)) in self.clusters.iter().enumerate() {
            if i > 0 {
                info.push(',');
            }
            info.push_str(&format!("{}->{}", coordinate + 1, count));
        }
        info
    }

    /// Append this site as one newline-terminated line.
    pub fn write_line(&self, out: &mut String) {
        out.push_str(&format!(
            "{}\t{}\t.\tNA\tSV\t.\t.\t{}\t{}",
            self.chrom,
            self.position + 1,
            self.info_field(),
            FORMAT_FIELDS
        ));
        for record in &self.samples {
            let call = &record.call;
            let [hom_ref, het, hom_alt] = call.log_likelihoods;
            out.push_str(&format!(
                "\t{}:{},{},{}:{}:{}:{}:{}",
                call.genotype,
                hom_ref,
                het,
                hom_alt,
                call.n_alt,
                call.n_ref,
                record.clipped_bases,
                record.n_reads
            ));
        }
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breakpoint::cohort::CohortTest;
    use crate::breakpoint::evidence::SampleSiteRecord;
    use crate::breakpoint::genotype::Genotype;
    use std::collections::BTreeMap;

    #[test]
    fn header_lists_samples_target_first() {
        let samples = SampleCatalog::new(&["t1.bam", "t2.bam"], &["b.bam"]).unwrap();
        let mut buf = Vec::new();
        write_header(&mut buf, &samples).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("##fileformat=VCFv4.1\n"));
        assert!(text.contains("##INFO=<ID=LRT"));
        assert!(text.contains("##FORMAT=<ID=DP"));
        let last = text.lines().last().unwrap();
        assert_eq!(
            last,
            "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tt1.bam\tt2.bam\tb.bam"
        );
    }

    #[test]
    fn site_line_layout() {
        let mut record = SampleSiteRecord::new();
        record.n_reads = 1;
        record.clipped_bases = 20;
        let mut clusters = BTreeMap::new();
        clusters.insert(999, 2);
        clusters.insert(1099, 3);
        let site = SiteCall {
            chrom: "chr2".into(),
            position: 999,
            clusters,
            cohort: CohortTest::from_genotypes([Genotype::Het], [Genotype::HomRef]),
            samples: vec![record],
        };
        let mut out = String::new();
        site.write_line(&mut out);
        assert!(out.ends_with('\n'));
        let cols: Vec<_> = out.trim_end().split('\t').collect();
        assert_eq!(cols.len(), 10);
        assert_eq!(&cols[..7], &["chr2", "1000", ".", "NA", "SV", ".", "."]);
        assert!(cols[7].starts_with("LRT="));
        assert!(cols[7].contains(";AF=0.5,0.00001,"));
        assert!(cols[7].contains(";GC=1,1;NALT=1,0;"));
        assert!(cols[7].ends_with(";CLUSTERS=1000->2,1100->3"));
        assert_eq!(cols[8], FORMAT_FIELDS);
        assert_eq!(cols[9], "./.:-255,-255,-255:0:0:20:1");
    }
}
