//! Analyze a small collection with stand-in `vina` and `obabel` scripts.
//!
//! Kept as a single test so the scripts are never written while another
//! test thread is spawning processes.

#![cfg(unix)]

use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::tempdir;
use vinyx_docking::docking::VinaOptions;
use vinyx_docking::{run_analyze, AnalyzeJob};

const FAKE_VINA: &str = r#"#!/bin/sh
while [ $# -gt 0 ]; do
  case "$1" in
    --out) out="$2"; shift ;;
    --log) log="$2"; shift ;;
    --ligand) lig="$2"; shift ;;
  esac
  shift
done
case "$lig" in
  *_bad.pdbqt) echo "could not parse ligand $lig" >&2; exit 1 ;;
esac
aff=$(sed -n 's/^AFF //p' "$lig")
printf 'mode |   affinity | dist from best mode\n     | (kcal/mol) | rmsd l.b.| rmsd u.b.\n-----+------------+----------+----------\n   1   %s   0.000   0.000\n' "$aff" > "$log"
cp "$lig" "$out"
"#;

const FAKE_OBABEL: &str = "#!/bin/sh\nprintf 'CCO\\t%s\\n' \"$3\" > \"$7\"\n";

fn write_script(path: &Path, body: &str) -> PathBuf {
    fs::write(path, body).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    path.to_path_buf()
}

fn build_archive(path: &Path, ligands: &[(&str, &str)]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let file = File::create(path).unwrap();
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
    for (name, affinity) in ligands {
        let body = format!("REMARK ligand\nAFF {}\n", affinity);
        let mut header = tar::Header::new_gnu();
        header.set_size(body.len() as u64);
        header.set_mode(0o644);
        builder
            .append_data(&mut header, format!("xaaa/{name}"), body.as_bytes())
            .unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap();
}

fn options(receptor: PathBuf) -> VinaOptions {
    VinaOptions {
        receptor,
        center_x: 0.0,
        center_y: 1.5,
        center_z: -2.0,
        size_x: 20.0,
        size_y: 20.0,
        size_z: 20.0,
        flex: None,
        cpu: Some(1),
        seed: Some(42),
        exhaustiveness: None,
        num_modes: None,
        energy_range: None,
        weight_hydrogen: None,
    }
}

#[tokio::test]
async fn test_analyze_collection_skips_failing_ligands() {
    let dir = tempdir().unwrap();
    let bin = dir.path().join("bin");
    fs::create_dir_all(&bin).unwrap();
    let vina = write_script(&bin.join("vina"), FAKE_VINA);
    let obabel = write_script(&bin.join("obabel"), FAKE_OBABEL);

    let receptor = dir.path().join("receptor.pdbqt");
    fs::write(&receptor, "RECEPTOR\n").unwrap();
    let archive = dir.path().join("AA/xaaa.xaa.tar.gz");
    build_archive(
        &archive,
        &[("ZINC01.pdbqt", "-7.0"), ("ZINC02_bad.pdbqt", "-9.0"), ("ZINC03.pdbqt", "-6.25")],
    );

    let out = dir.path().join("out");
    let mut job = AnalyzeJob {
        input: archive,
        output: out.clone(),
        vina: options(receptor),
        limit: None,
        vina_executable: vina,
        obabel_executable: obabel,
    };

    let result = run_analyze(&job).await.unwrap();
    assert_eq!(result.ligands_found, 3);
    assert_eq!(result.analyzed, 2);
    assert_eq!(result.failed, 1);
    assert_eq!(result.collection_dir, out.join("AA/xaaa"));
    assert_eq!(
        fs::read_to_string(&result.results_file).unwrap(),
        "AA_xaaa,ZINC01.pdbqt,CCO,-7.0\nAA_xaaa,ZINC03.pdbqt,CCO,-6.25\n"
    );
    assert!(out.join("AA/xaaa/ZINC01/vina-log.txt").exists());
    assert!(out.join("AA/xaaa/ZINC01/output.smi").exists());
    let durations = fs::read_to_string(out.join("AA/xaaa/durations.txt")).unwrap();
    assert!(durations.lines().any(|l| l.starts_with("Total duration: ")));

    // A rerun wipes the previous collection; the limit caps the batch.
    job.limit = Some(1);
    let result = run_analyze(&job).await.unwrap();
    assert_eq!(result.ligands_found, 3);
    assert_eq!(result.analyzed, 1);
    assert_eq!(result.failed, 0);
    assert_eq!(
        fs::read_to_string(&result.results_file).unwrap(),
        "AA_xaaa,ZINC01.pdbqt,CCO,-7.0\n"
    );
    assert!(!out.join("AA/xaaa/ZINC03").exists());
}
