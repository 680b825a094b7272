//! End-to-end tests of the `genokit` binary.
//!
//! Each test writes small inputs to a temporary directory and checks exit
//! codes and outputs of one action.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn genokit() -> Command {
    Command::cargo_bin("genokit").expect("binary should be built")
}

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("Failed to write test input");
    path
}

const BLAST: &str = "\
q1\ts1\t99.0\t200\t2\t0\t1\t200\t1\t200\t1e-50\t300
q1\ts2\t95.0\t100\t5\t0\t1\t100\t1\t100\t1e-20\t150
q2\ts1\t90.0\t100\t10\t0\t1\t100\t500\t401\t1e-10\t80
";

const COORDS: &str = "\
/ref.fasta /query.fasta
NUCMER

    [S1]     [E1]  |     [S2]     [E2]  |  [LEN 1]  [LEN 2]  |  [% IDY]  |  [LEN R]  [LEN Q]  |  [COV R]  [COV Q]  | [TAGS]
=====================================================================================================================
       1     1000  |        1     1000  |     1000     1000  |   100.00  |    50000     1000  |     2.00   100.00  | chr1\tctgA
";

const SIZES: &str = "q1\t300\nq2\t100\nq3\t50\n";

// ---------------------------------------------------------------------------
// Usage and help
// ---------------------------------------------------------------------------

/// No module at all lists the modules and exits with a usage error
#[test]
fn test_no_arguments_shows_help() {
    genokit()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("fasta").and(predicate::str::contains("blast")));
}

/// A module without an action lists its actions
#[test]
fn test_module_lists_actions() {
    genokit()
        .arg("fasta")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("sizes").and(predicate::str::contains("gaps")));
}

/// An action missing its arguments prints its full help, options and defaults included
#[test]
fn test_action_missing_arguments() {
    genokit()
        .args(["fasta", "filter"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage").and(predicate::str::contains("--less")));

    genokit()
        .args(["blast", "filter"])
        .assert()
        .code(2)
        .stderr(
            predicate::str::contains("--pctid").and(predicate::str::contains("[default: 95]")),
        );
}

#[test]
fn test_unknown_action() {
    genokit().args(["blast", "frobnicate"]).assert().code(2);
}

#[test]
fn test_missing_input_is_runtime_error() {
    genokit()
        .args(["bed", "summary", "/nonexistent/file.bed"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("file.bed"));
}

// ---------------------------------------------------------------------------
// fasta and sizes
// ---------------------------------------------------------------------------

#[test]
fn test_fasta_sizes() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let fasta = write_file(dir.path(), "seqs.fasta", ">a first\nACGT\nNN\n>b\nAC\n");

    genokit()
        .args(["fasta", "sizes"])
        .arg(&fasta)
        .assert()
        .success()
        .stdout("a\t6\nb\t2\n");
}

#[test]
fn test_fasta_filter_to_file() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let fasta = write_file(dir.path(), "seqs.fasta", ">a\nACGTACGT\n>b\nAC\n");
    let output = dir.path().join("long.fasta");

    genokit()
        .args(["fasta", "filter"])
        .arg(&fasta)
        .arg("5")
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    let written = fs::read_to_string(&output).expect("Failed to read output");
    assert_eq!(written, ">a\nACGTACGT\n");
}

#[test]
fn test_sizes_lft_default_output() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let sizes = write_file(dir.path(), "genome.fasta.sizes", "chr1\t100\nchr2\t50\n");

    genokit().args(["sizes", "lft"]).arg(&sizes).assert().success();

    let written =
        fs::read_to_string(dir.path().join("genome.lft")).expect("Failed to read output");
    assert_eq!(written, "0\tchr1\t100\tchr1\t100\n0\tchr2\t50\tchr2\t50\n");
}

/// `-` reads the input from stdin
#[test]
fn test_fasta_sizes_from_stdin() {
    genokit()
        .args(["fasta", "sizes", "-"])
        .write_stdin(">a\nACGT\n>b\nAC\n")
        .assert()
        .success()
        .stdout("a\t4\nb\t2\n");
}

/// Listed IDs absent from the FASTA are reported on stderr
#[test]
fn test_fasta_some_warns_on_unseen_ids() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let fasta = write_file(dir.path(), "seqs.fasta", ">a\nACGT\n>b\nAC\n");
    let ids = write_file(dir.path(), "ids.txt", "a\nzz\n");

    genokit()
        .args(["fasta", "some"])
        .arg(&fasta)
        .arg(&ids)
        .assert()
        .success()
        .stdout(">a\nACGT\n")
        .stderr(predicate::str::contains("zz not found in"));
}

/// A default output path cannot be derived from stdin
#[test]
fn test_sizes_agp_from_stdin_needs_output() {
    genokit()
        .args(["sizes", "agp", "-"])
        .write_stdin("chr1\t100\n")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("`-o` is required"));
}

// ---------------------------------------------------------------------------
// agp and bed
// ---------------------------------------------------------------------------

/// Validation problems are printed and the exit code is 1
#[test]
fn test_agp_validate_failure() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let agp = write_file(
        dir.path(),
        "bad.agp",
        "chr1\t5\t104\t1\tW\tctg1\t1\t100\t+\n",
    );

    genokit()
        .args(["agp", "validate"])
        .arg(&agp)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("expected to start at 1"));
}

#[test]
fn test_agp_validate_success() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let agp = write_file(
        dir.path(),
        "good.agp",
        "chr1\t1\t100\t1\tW\tctg1\t1\t100\t+\n\
         chr1\t101\t150\t2\tN\t50\tscaffold\tyes\tpaired-ends\n",
    );

    genokit()
        .args(["agp", "validate"])
        .arg(&agp)
        .assert()
        .success()
        .stdout("");
}

#[test]
fn test_bed_merge() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let bed = write_file(
        dir.path(),
        "in.bed",
        "chr1\t0\t10\nchr1\t5\t20\nchr1\t30\t40\n",
    );

    genokit()
        .args(["bed", "merge"])
        .arg(&bed)
        .assert()
        .success()
        .stdout("chr1\t0\t20\nchr1\t30\t40\n");
}

/// Gap rows may stop after the linkage column
#[test]
fn test_agp_validate_gap_without_evidence() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let agp = write_file(
        dir.path(),
        "short.agp",
        "chr1\t1\t100\t1\tW\tctg1\t1\t100\t+\n\
         chr1\t101\t150\t2\tN\t50\tscaffold\tyes\n",
    );

    genokit()
        .args(["agp", "validate"])
        .arg(&agp)
        .assert()
        .success()
        .stdout("");
}

/// Zero-length features keep their coordinates
#[test]
fn test_bed_merge_zero_length() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let bed = write_file(dir.path(), "point.bed", "chr1\t5\t5\n");

    genokit()
        .args(["bed", "merge"])
        .arg(&bed)
        .assert()
        .success()
        .stdout("chr1\t5\t5\n");
}

#[test]
fn test_bed_summary_tsv() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let bed = write_file(dir.path(), "in.bed", "chr1\t0\t10\nchr2\t5\t20\n");

    let assert = genokit()
        .args(["bed", "summary", "--format", "tsv"])
        .arg(&bed)
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "features\tseqids\ttotal_bases\tcovered_bases\tmean_size");
    assert!(lines[1].starts_with("2\t2\t"));
}

// ---------------------------------------------------------------------------
// blast and coords
// ---------------------------------------------------------------------------

#[test]
fn test_blast_best_default_output() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let blast = write_file(dir.path(), "hits.blast", BLAST);

    genokit().args(["blast", "best"]).arg(&blast).assert().success();

    let written =
        fs::read_to_string(dir.path().join("hits.blast.best")).expect("Failed to read output");
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("q1\ts1\t"));
    assert!(lines[1].starts_with("q2\ts1\t"));
}

#[test]
fn test_blast_filter_default_output() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let blast = write_file(dir.path(), "hits.blast", BLAST);

    genokit()
        .args(["blast", "filter", "--pctid", "95", "--hitlen", "100"])
        .arg(&blast)
        .assert()
        .success();

    let written = fs::read_to_string(dir.path().join("hits.blast.P95L100"))
        .expect("Failed to read output");
    assert_eq!(written.lines().count(), 2);
    assert!(!written.contains("q2"));
}

#[test]
fn test_blast_summary_json() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let blast = write_file(dir.path(), "hits.blast", BLAST);

    genokit()
        .args(["blast", "summary", "--format", "json"])
        .arg(&blast)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"query_covered\""));
}

#[test]
fn test_coords_blast_default_output() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let coords = write_file(dir.path(), "aln.coords", COORDS);
    let output = dir.path().join("aln.blast");

    genokit()
        .args(["coords", "blast"])
        .arg(&coords)
        .assert()
        .success();

    let written = fs::read_to_string(&output).expect("Failed to read output");
    assert!(written.starts_with("ctgA\tchr1\t100.0\t1000\t0\t0\t1\t1000\t1\t1000\t"));
}

/// Without `-o`, the sorted hits replace the input file
#[test]
fn test_blast_sort_in_place() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let lines: Vec<&str> = BLAST.lines().collect();
    let shuffled = format!("{}\n{}\n{}\n", lines[2], lines[1], lines[0]);
    let blast = write_file(dir.path(), "hits.blast", &shuffled);

    genokit().args(["blast", "sort"]).arg(&blast).assert().success();

    let written = fs::read_to_string(&blast).expect("Failed to read output");
    assert_eq!(written, BLAST);
}

/// Compressed input is never overwritten
#[test]
fn test_blast_sort_compressed_needs_output() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let blast = write_file(dir.path(), "hits.blast.gz", "");

    genokit()
        .args(["blast", "sort"])
        .arg(&blast)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("compressed"));
}

#[test]
fn test_blast_best_from_stdin() {
    genokit()
        .args(["blast", "best", "-"])
        .write_stdin(BLAST)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("`-o` is required"));

    let dir = TempDir::new().expect("Failed to create temp dir");
    let output = dir.path().join("best.blast");
    genokit()
        .args(["blast", "best", "-", "-o"])
        .arg(&output)
        .write_stdin(BLAST)
        .assert()
        .success();

    let written = fs::read_to_string(&output).expect("Failed to read output");
    assert_eq!(written.lines().count(), 2);
}

/// `--list` reports every sized query and the report goes to a log file
#[test]
fn test_blast_covfilter_list_and_log() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let blast = write_file(dir.path(), "hits.blast", BLAST);
    let sizes = write_file(dir.path(), "q.sizes", SIZES);

    genokit()
        .args(["blast", "covfilter", "--list"])
        .arg(&blast)
        .arg(&sizes)
        .assert()
        .success()
        .stdout("q1\t97.7\t66.7\nq2\t0.0\t0.0\nq3\t0.0\t0.0\n")
        .stderr(predicate::str::contains("Total valid"));

    let log = fs::read_to_string(dir.path().join("hits.blast.covfilter.log"))
        .expect("Failed to read log");
    assert!(log.contains("Total valid (id=95% cov=50%): 1 (33.3% of 3)"));
}

#[test]
fn test_blast_score() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let blast = write_file(dir.path(), "hits.blast", BLAST);
    let sizes = write_file(dir.path(), "q.sizes", SIZES);
    let ids = write_file(dir.path(), "subjects.txt", "s1\n");

    genokit()
        .args(["blast", "score"])
        .arg(&blast)
        .arg(&sizes)
        .arg(&ids)
        .assert()
        .success()
        .stdout("q1\t300.0\nq2\t80.0\nq3\t0.0\n");
}

#[test]
fn test_blast_subset() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let blast = write_file(dir.path(), "hits.blast", BLAST);
    let qbed = write_file(dir.path(), "q.bed", "chr1\t0\t100\tq1\nchr2\t0\t100\tq2\n");
    let sbed = write_file(dir.path(), "s.bed", "chrA\t0\t100\ts1\nchrB\t0\t100\ts2\n");

    // One of --qchrs and --schrs is required
    genokit()
        .args(["blast", "subset"])
        .arg(&blast)
        .arg(&qbed)
        .arg(&sbed)
        .assert()
        .code(2);

    genokit()
        .args(["blast", "subset", "--qchrs", "chr1", "--convert"])
        .arg(&blast)
        .arg(&qbed)
        .arg(&sbed)
        .assert()
        .success();

    let written = fs::read_to_string(dir.path().join("hits.blast.chr1.blast"))
        .expect("Failed to read output");
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("chr1_00000\tchrA_00000\t"));
    assert!(lines[1].starts_with("chr1_00000\tchrB_00001\t"));
}

#[test]
fn test_blast_annotation() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let blast = write_file(dir.path(), "hits.blast", BLAST);
    let names = write_file(dir.path(), "names.txt", "q1\tgeneOne\n");

    genokit()
        .args(["blast", "annotation", "--queryids"])
        .arg(&names)
        .arg(&blast)
        .assert()
        .success()
        .stdout("geneOne\ts1\ngeneOne\ts2\nq2\ts1\n");
}

#[test]
fn test_blast_completeness() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let blast = write_file(dir.path(), "hits.blast", BLAST);
    let sizes = write_file(dir.path(), "s.sizes", "s1\t1000\ns2\t100\n");

    genokit()
        .args(["blast", "completeness"])
        .arg(&blast)
        .arg(&sizes)
        .assert()
        .success()
        .stdout("q1\ts1\t0\t800\t20\nq2\ts1\t400\t500\t10\n")
        .stderr(predicate::str::contains("Total: 2, Coverage > 50%: 0 (0.0%)"));
}

/// Only hits passing the cutoffs with a recognized overlap are printed
#[test]
fn test_blast_annotate() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let blast = write_file(dir.path(), "hits.blast", BLAST);
    let qsizes = write_file(dir.path(), "q.sizes", "q1\t400\nq2\t100\n");
    let ssizes = write_file(dir.path(), "s.sizes", "s1\t250\ns2\t1000\n");

    let first = BLAST.lines().next().expect("fixture has rows");
    genokit()
        .args(["blast", "annotate", "--hitlen", "100", "--hang", "50"])
        .arg(&blast)
        .arg(&qsizes)
        .arg(&ssizes)
        .assert()
        .success()
        .stdout(format!("{first}\tb ~ a\n"));
}

/// Annotated rows keep the alignment row as read
#[test]
fn test_coords_annotate() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let coords = write_file(dir.path(), "aln.coords", COORDS);
    let row = COORDS.lines().last().expect("fixture has rows").trim_end();

    genokit()
        .args(["coords", "annotate"])
        .arg(&coords)
        .assert()
        .success()
        .stdout(format!("{row}\tb ~ a\n"));
}

#[test]
fn test_btab_conversions() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let row = [
        "ctg1 len=5000",
        "Jan 01 2012",
        "5000",
        "blastn",
        "genes.fa",
        "geneA",
        "101",
        "400",
        "10",
        "309",
        "98.5",
        "99.0",
        "0",
        "550.5",
        "0",
        "putative kinase",
        "1",
        "Minus",
        "2000",
        "3.2e-40",
        "1e-40",
    ]
    .join("\t");
    let btab = write_file(dir.path(), "hits.btab", &format!("{row}\n"));

    genokit()
        .args(["btab", "blast"])
        .arg(&btab)
        .assert()
        .success()
        .stdout("ctg1\tgeneA putative kinase\t98.50\t0\t0\t0\t101\t400\t309\t10\t3e-40\t550.5\n");

    genokit()
        .args(["btab", "bed"])
        .arg(&btab)
        .assert()
        .success()
        .stdout("geneA putative kinase\t9\t309\tctg1\t550.5\t-\n");
}

// ---------------------------------------------------------------------------
// gff and sam
// ---------------------------------------------------------------------------

#[test]
fn test_gff_bed() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let gff = write_file(
        dir.path(),
        "genes.gff",
        "##gff-version 3\n\
         chr2\tsrc\tgene\t50\t80\t.\t-\t.\tID=g2\n\
         chr1\tsrc\tgene\t100\t200\t.\t+\t.\tID=g1;Name=first\n\
         chr1\tsrc\tmRNA\t100\t200\t.\t+\t.\tID=m1;Parent=g1\n",
    );

    genokit()
        .args(["gff", "bed"])
        .arg(&gff)
        .assert()
        .success()
        .stdout("chr1\t99\t200\tg1\t1000\t+\nchr2\t49\t80\tg2\t1000\t-\n");
}

#[test]
fn test_sam_pair() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let sam = write_file(
        dir.path(),
        "aln.sam",
        "@SQ\tSN:chr1\tLN:1000\n\
         read1\t0\tchr1\t100\t60\t50M20H\t*\t0\t0\tACGT\tIIII\n",
    );

    genokit()
        .args(["sam", "pair"])
        .arg(&sam)
        .assert()
        .success()
        .stdout("read1:50M20\tchr1:100\n");
}

#[test]
fn test_sam_sizes() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let sam = write_file(
        dir.path(),
        "aln.sam",
        "@HD\tVN:1.6\n@SQ\tSN:chr1\tLN:1000\n@SQ\tSN:chr2\tLN:250\n",
    );

    genokit()
        .args(["sam", "sizes"])
        .arg(&sam)
        .assert()
        .success()
        .stdout("chr1\t1000\nchr2\t250\n");
}

/// Mean depth per sequence, the `genome` summary rows skipped
#[test]
fn test_sam_coverage() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let genomecov = write_file(
        dir.path(),
        "aln.genomecov",
        "chr1\t0\t600\t1000\t0.6\n\
         chr1\t2\t400\t1000\t0.4\n\
         chr2\t1\t250\t250\t1.0\n\
         genome\t0\t600\t1250\t0.48\n",
    );

    genokit()
        .args(["sam", "coverage"])
        .arg(&genomecov)
        .assert()
        .success()
        .stdout("chr1\t0.8\nchr2\t1\n");
}
