/// End-to-end tests for the group -> SAM text pipeline:
/// header emission, per-mate field computation and the deferred filtering
/// policy, all observed through the final serialized output.
use blast2sam::hsp::{HitGroup, Hsp, MateSlot, Query, Record};
use blast2sam::sam_opt::SamOpt;
use blast2sam::sam_writer::write_sam;
use std::io::Write as _;

fn dict_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn opt_with_dict(dict: &tempfile::NamedTempFile) -> SamOpt {
    let mut opt = SamOpt::default();
    opt.ref_dict = dict.path().to_path_buf();
    opt
}

/// Identity alignment covering the whole read.
fn full_match(query: &Query, hit_from: i64, hit_to: i64) -> Hsp {
    Hsp::new(
        1,
        query.read_len as i64,
        hit_from,
        hit_to,
        query.seq.clone(),
        query.seq.clone(),
    )
}

fn render(groups: &[HitGroup<'_>], opt: &SamOpt) -> String {
    let mut out = Vec::new();
    write_sam(&mut out, groups, opt, "@PG\tID:blast2sam").unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn test_proper_pair_end_to_end() {
    let dict = dict_file("@HD\tVN:1.6\n@SQ\tSN:chr1\tLN:248956422\tM5:9a6f\n");
    let mut opt = opt_with_dict(&dict);
    opt.set_read_group("@RG\tID:grp1").unwrap();

    let read1 = Query::new("frag1", "ACGTACGTAC", "IIIIIIIIII");
    let read2 = Query::new("frag1", "AACCGGTTAA", "ABCDEFGHIJ");

    let groups = vec![HitGroup {
        records: vec![Record::paired(
            MateSlot::mapped(
                &read1,
                "chr1 Homo sapiens chromosome 1",
                full_match(&read1, 1000, 1009),
            ),
            MateSlot::mapped(
                &read2,
                "chr1 Homo sapiens chromosome 1",
                full_match(&read2, 1029, 1020),
            ),
        )],
    }];

    let expected = "\
@SQ\tSN:chr1\tLN:248956422
@RG\tID:grp1
@PG\tID:blast2sam
frag1\t99\tchr1\t1000\t60\t10=\t=\t1020\t-21\tACGTACGTAC\tIIIIIIIIII\tNM:i:0\tRG:Z:grp1
frag1\t147\tchr1\t1020\t60\t10=\t=\t1000\t21\tTTAACCGGTT\tJIHGFEDCBA\tNM:i:0\tRG:Z:grp1
";
    assert_eq!(render(&groups, &opt), expected);
}

#[test]
fn test_min_len_deferral_emits_only_last_candidate() {
    // Three candidates for one read pair; only the third has its first mate
    // above the threshold, its second mate stays below. The first two are
    // suppressed and the third goes out with mate1 forced unmapped.
    let dict = dict_file("@HD\tVN:1.6\n@SQ\tSN:chr1\tLN:1000000\n");
    let mut opt = opt_with_dict(&dict);
    opt.min_align_len = 50;

    let read1 = Query::new("frag2", "A".repeat(100), "I".repeat(100));
    let read2 = Query::new("frag2", "C".repeat(30), "J".repeat(30));

    let short0 = |from: i64| Hsp::new(1, 30, from, from + 29, "A".repeat(30), "A".repeat(30));
    let short1 = |from: i64| Hsp::new(1, 30, from, from + 29, "C".repeat(30), "C".repeat(30));

    let groups = vec![HitGroup {
        records: vec![
            Record::paired(
                MateSlot::mapped(&read1, "chr1", short0(1000)),
                MateSlot::mapped(&read2, "chr1", short1(1100)),
            ),
            Record::paired(
                MateSlot::mapped(&read1, "chr1", short0(2000)),
                MateSlot::mapped(&read2, "chr1", short1(2100)),
            ),
            Record::paired(
                MateSlot::mapped(&read1, "chr1", full_match(&read1, 3000, 3099)),
                MateSlot::mapped(&read2, "chr1", short1(3100)),
            ),
        ],
    }];

    let output = render(&groups, &opt);
    let data_lines: Vec<&str> = output.lines().filter(|l| !l.starts_with('@')).collect();
    assert_eq!(data_lines.len(), 2);

    // Mapped first mate, mate-unmapped flag set: 0x1 | 0x8 | 0x40
    let mate0: Vec<&str> = data_lines[0].split('\t').collect();
    assert_eq!(mate0[0], "frag2");
    assert_eq!(mate0[1], "73");
    assert_eq!(mate0[3], "3000");
    assert_eq!(mate0[5], "100=");
    assert_eq!(mate0[6], "*");
    assert_eq!(mate0[7], "0");
    assert_eq!(mate0[8], "0");

    // Forced-unmapped second mate: 0x1 | 0x4 | 0x80
    let mate1: Vec<&str> = data_lines[1].split('\t').collect();
    assert_eq!(mate1[1], "133");
    assert_eq!(mate1[2], "*");
    assert_eq!(mate1[3], "0");
    assert_eq!(mate1[4], "0");
    assert_eq!(mate1[5], "*");
    assert_eq!(mate1[9], "C".repeat(30));
    // Unmapped rows carry no NM tag
    assert_eq!(mate1.len(), 11);
}

#[test]
fn test_improper_pair_resolves_unmapped_on_last_candidate() {
    let dict = dict_file("@HD\tVN:1.6\n@SQ\tSN:chr1\tLN:1000000\n");
    let opt = opt_with_dict(&dict);

    let read1 = Query::new("frag3", "ACGTACGTAC", "IIIIIIIIII");
    let read2 = Query::new("frag3", "AACCGGTTAA", "JJJJJJJJJJ");

    // Mates ~4000 apart with spans of 10: improper on the only candidate
    let groups = vec![HitGroup {
        records: vec![Record::paired(
            MateSlot::mapped(&read1, "chr1", full_match(&read1, 1000, 1009)),
            MateSlot::mapped(&read2, "chr1", full_match(&read2, 5000, 5009)),
        )],
    }];

    let output = render(&groups, &opt);
    let data_lines: Vec<&str> = output.lines().filter(|l| !l.starts_with('@')).collect();
    assert_eq!(data_lines.len(), 2);

    // Both mates forced unmapped: 0x1 | 0x4 | 0x8 plus the in-pair bit
    let mate0: Vec<&str> = data_lines[0].split('\t').collect();
    assert_eq!(mate0[1], "77");
    assert_eq!(mate0[2], "*");
    assert_eq!(mate0[5], "*");
    assert_eq!(mate0[6], "*");
    assert_eq!(mate0[8], "0");

    let mate1: Vec<&str> = data_lines[1].split('\t').collect();
    assert_eq!(mate1[1], "141");
}

#[test]
fn test_secondary_flag_on_later_candidates() {
    let dict = dict_file("@HD\tVN:1.6\n@SQ\tSN:chr1\tLN:1000000\n");
    let opt = opt_with_dict(&dict);

    let read = Query::new("frag4", "ACGTACGTAC", "IIIIIIIIII");
    let groups = vec![HitGroup {
        records: vec![
            Record::single(MateSlot::mapped(&read, "chr1", full_match(&read, 1000, 1009))),
            Record::single(MateSlot::mapped(&read, "chr1", full_match(&read, 7000, 7009))),
        ],
    }];

    let output = render(&groups, &opt);
    let flags: Vec<&str> = output
        .lines()
        .filter(|l| !l.starts_with('@'))
        .map(|l| l.split('\t').nth(1).unwrap())
        .collect();
    assert_eq!(flags, vec!["0", "256"]);
}

#[test]
fn test_malformed_read_group_drops_line_and_tag() {
    let dict = dict_file("@HD\tVN:1.6\n@SQ\tSN:chr1\tLN:1000000\n");
    let mut opt = opt_with_dict(&dict);
    // A caller-provided line missing its ID field never reaches the header
    // and never yields an RG tag
    opt.read_group = Some("@RG\tSM:sample1".to_string());

    let read = Query::new("frag5", "ACGT", "IIII");
    let groups = vec![HitGroup {
        records: vec![Record::single(MateSlot::mapped(
            &read,
            "chr1",
            full_match(&read, 100, 103),
        ))],
    }];

    let output = render(&groups, &opt);
    assert!(!output.contains("@RG"));
    assert!(!output.contains("RG:Z:"));
    assert!(output.contains("@PG\tID:blast2sam"));
}
