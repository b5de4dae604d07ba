//! End-to-end tests for dirsort.
//!
//! Each test builds a throwaway directory, runs commands through
//! `run_cli` the way the binary does, and checks the result on disk.

use dirsort::cli::{OrganizeCommand, run_cli};
use dirsort::move_log::{MoveLog, SIDECAR_FILE_NAME};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ============================================================================
// Test Utilities
// ============================================================================

struct TestFixture {
    temp_dir: TempDir,
}

impl TestFixture {
    fn new() -> Self {
        TestFixture {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    fn run(&self, command: OrganizeCommand) -> Result<(), String> {
        run_cli(command, self.path())
    }

    fn organize(&self) {
        self.run(OrganizeCommand::Organize { dry_run: false })
            .expect("organize should succeed");
    }

    fn dry_run(&self) {
        self.run(OrganizeCommand::Organize { dry_run: true })
            .expect("dry run should succeed");
    }

    fn undo(&self) {
        self.run(OrganizeCommand::Undo).expect("undo should succeed");
    }

    fn create_file(&self, rel_path: &str, content: &str) {
        let path = self.path().join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(path, content).expect("Failed to write file");
    }

    fn create_subdir(&self, name: &str) {
        fs::create_dir(self.path().join(name)).expect("Failed to create subdirectory");
    }

    fn assert_dir_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(path.is_dir(), "Directory should exist: {}", path.display());
    }

    fn assert_file_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(path.is_file(), "File should exist: {}", path.display());
    }

    fn assert_not_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(!path.exists(), "Should not exist: {}", path.display());
    }

    fn read(&self, rel_path: &str) -> String {
        fs::read_to_string(self.path().join(rel_path)).expect("Failed to read file")
    }

    fn sidecar(&self) -> Option<MoveLog> {
        MoveLog::load(self.path()).expect("sidecar should parse")
    }

    /// Every file under the directory with its content, keyed by relative path.
    fn snapshot(&self) -> BTreeMap<PathBuf, String> {
        let mut files = BTreeMap::new();
        Self::walk(self.path(), self.path(), &mut files);
        files
    }

    fn walk(root: &Path, dir: &Path, files: &mut BTreeMap<PathBuf, String>) {
        for entry in fs::read_dir(dir).expect("Failed to read directory").flatten() {
            let path = entry.path();
            if path.is_dir() {
                Self::walk(root, &path, files);
            } else {
                let rel = path.strip_prefix(root).unwrap().to_path_buf();
                files.insert(rel, fs::read_to_string(&path).unwrap_or_default());
            }
        }
    }

    fn top_level_dirs(&self) -> Vec<String> {
        let mut dirs: Vec<String> = fs::read_dir(self.path())
            .expect("Failed to read directory")
            .flatten()
            .filter(|e| e.path().is_dir())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        dirs.sort();
        dirs
    }
}

// ============================================================================
// Organize
// ============================================================================

#[test]
fn test_organize_mixed_directory() {
    let fixture = TestFixture::new();
    fixture.create_file("photo.JPG", "jpeg");
    fixture.create_file("notes.txt", "notes");
    fixture.create_file("archive.zip", "zip");
    fixture.create_file("run.sh", "#!/bin/sh");
    fixture.create_subdir("Keep");
    fixture.create_file("Keep/inside.txt", "stay");

    fixture.organize();

    fixture.assert_file_exists("Images/photo.JPG");
    fixture.assert_file_exists("Text/notes.txt");
    fixture.assert_file_exists("Compressed/archive.zip");
    fixture.assert_file_exists("Programs/run.sh");
    fixture.assert_file_exists("Keep/inside.txt");
    fixture.assert_not_exists("Text/inside.txt");

    let log = fixture.sidecar().expect("sidecar should exist");
    assert_eq!(log.len(), 4);
    for record in log.records() {
        assert!(record.from.is_absolute());
        assert!(record.to.is_file());
        assert!(!record.from.exists());
    }
}

#[test]
fn test_unknown_extension_goes_to_others() {
    let fixture = TestFixture::new();
    fixture.create_file("file.xyz", "?");
    fixture.create_file("LICENSE", "mit");

    fixture.organize();

    fixture.assert_file_exists("Others/file.xyz");
    fixture.assert_file_exists("Others/LICENSE");
    assert_eq!(fixture.top_level_dirs(), vec!["Others".to_string()]);
}

#[test]
fn test_every_category_folder() {
    let fixture = TestFixture::new();
    for name in [
        "a.png", "b.docx", "c.md", "d.csv", "e.7z", "f.deb", "g.flac", "h.mkv", "i.bin",
    ] {
        fixture.create_file(name, name);
    }

    fixture.organize();

    assert_eq!(
        fixture.top_level_dirs(),
        vec![
            "Audio",
            "Compressed",
            "Documents",
            "Excel",
            "Images",
            "Others",
            "Programs",
            "Text",
            "Video"
        ]
    );
    fixture.assert_file_exists("Excel/d.csv");
    fixture.assert_file_exists("Documents/b.docx");
}

#[test]
fn test_category_named_directory_is_not_moved() {
    let fixture = TestFixture::new();
    fixture.create_subdir("Images");
    fixture.create_subdir("archive.zip");
    fixture.create_file("pic.gif", "gif");

    fixture.organize();

    fixture.assert_file_exists("Images/pic.gif");
    fixture.assert_dir_exists("archive.zip");
    fixture.assert_not_exists("Compressed");
    assert_eq!(fixture.sidecar().unwrap().len(), 1);
}

#[test]
fn test_organize_empty_directory_writes_no_sidecar() {
    let fixture = TestFixture::new();

    fixture.organize();

    fixture.assert_not_exists(SIDECAR_FILE_NAME);
    assert!(fixture.top_level_dirs().is_empty());
}

#[test]
fn test_organize_preserves_content() {
    let fixture = TestFixture::new();
    fixture.create_file("report.pdf", "%PDF-1.4 body");

    fixture.organize();

    assert_eq!(fixture.read("Documents/report.pdf"), "%PDF-1.4 body");
}

#[test]
fn test_organize_missing_directory_fails() {
    let fixture = TestFixture::new();
    let missing = fixture.path().join("nope");

    let result = run_cli(OrganizeCommand::Organize { dry_run: false }, &missing);

    assert!(result.is_err());
}

#[test]
fn test_collision_leaves_file_in_place() {
    let fixture = TestFixture::new();
    fixture.create_file("Text/notes.txt", "already sorted");
    fixture.create_file("notes.txt", "fresh");
    fixture.create_file("todo.md", "todo");

    fixture.organize();

    assert_eq!(fixture.read("notes.txt"), "fresh");
    assert_eq!(fixture.read("Text/notes.txt"), "already sorted");
    fixture.assert_file_exists("Text/todo.md");
    assert_eq!(fixture.sidecar().unwrap().len(), 1);
}

// ============================================================================
// Dry run
// ============================================================================

#[test]
fn test_dry_run_changes_nothing() {
    let fixture = TestFixture::new();
    fixture.create_file("photo.png", "png");
    fixture.create_file("song.mp3", "mp3");
    fixture.create_file("mystery", "?");
    let before = fixture.snapshot();

    fixture.dry_run();

    assert_eq!(fixture.snapshot(), before);
    assert!(fixture.top_level_dirs().is_empty());
    fixture.assert_not_exists(SIDECAR_FILE_NAME);
}

#[test]
fn test_dry_run_keeps_existing_sidecar_untouched() {
    let fixture = TestFixture::new();
    fixture.create_file("a.txt", "a");
    fixture.organize();
    let sidecar_before = fixture.read(SIDECAR_FILE_NAME);

    fixture.create_file("b.txt", "b");
    fixture.dry_run();

    assert_eq!(fixture.read(SIDECAR_FILE_NAME), sidecar_before);
    fixture.assert_file_exists("b.txt");
}

// ============================================================================
// Undo
// ============================================================================

#[test]
fn test_organize_then_undo_round_trip() {
    let fixture = TestFixture::new();
    fixture.create_file("photo.JPG", "jpeg");
    fixture.create_file("notes.txt", "notes");
    fixture.create_file("archive.zip", "zip");
    fixture.create_file("run.sh", "#!/bin/sh");
    fixture.create_file("file.xyz", "xyz");
    fixture.create_subdir("Keep");
    let before = fixture.snapshot();

    fixture.organize();
    assert_ne!(fixture.snapshot(), before);

    fixture.undo();

    assert_eq!(fixture.snapshot(), before);
    fixture.assert_not_exists(SIDECAR_FILE_NAME);
    assert_eq!(fixture.top_level_dirs(), vec!["Keep".to_string()]);
}

#[test]
fn test_second_undo_is_noop() {
    let fixture = TestFixture::new();
    fixture.create_file("notes.txt", "notes");
    fixture.organize();
    fixture.undo();
    let after_first = fixture.snapshot();

    fixture.undo();

    assert_eq!(fixture.snapshot(), after_first);
}

#[test]
fn test_undo_on_clean_directory_is_noop() {
    let fixture = TestFixture::new();
    fixture.create_file("notes.txt", "notes");

    fixture.undo();

    fixture.assert_file_exists("notes.txt");
}

#[test]
fn test_undo_with_corrupt_sidecar_fails() {
    let fixture = TestFixture::new();
    fixture.create_file(SIDECAR_FILE_NAME, "[{\"from\": 1}]");

    let result = fixture.run(OrganizeCommand::Undo);

    assert!(result.is_err());
    fixture.assert_file_exists(SIDECAR_FILE_NAME);
}

#[test]
fn test_undo_after_file_was_deleted_restores_the_rest() {
    let fixture = TestFixture::new();
    fixture.create_file("a.txt", "a");
    fixture.create_file("b.png", "b");
    fixture.organize();

    fs::remove_file(fixture.path().join("Text/a.txt")).unwrap();
    fixture.undo();

    fixture.assert_file_exists("b.png");
    fixture.assert_not_exists("a.txt");
    fixture.assert_not_exists(SIDECAR_FILE_NAME);
}

#[test]
fn test_undo_keeps_files_added_later() {
    let fixture = TestFixture::new();
    fixture.create_file("report.pdf", "report");
    fixture.organize();

    fixture.create_file("Documents/new_note.pdf", "later");
    fixture.undo();

    fixture.assert_file_exists("report.pdf");
    fixture.assert_file_exists("Documents/new_note.pdf");
}

#[test]
fn test_two_organize_runs_are_undone_together() {
    let fixture = TestFixture::new();
    fixture.create_file("first.png", "1");
    let original = fixture.snapshot();

    fixture.organize();
    fixture.create_file("second.png", "2");
    fixture.organize();
    assert_eq!(fixture.sidecar().unwrap().len(), 2);

    fixture.undo();

    fixture.assert_file_exists("first.png");
    fixture.assert_file_exists("second.png");
    fixture.assert_not_exists("Images");
    let mut expected = original;
    expected.insert(PathBuf::from("second.png"), "2".to_string());
    assert_eq!(fixture.snapshot(), expected);
}

#[test]
fn test_undo_keeps_category_folder_that_existed_before() {
    let fixture = TestFixture::new();
    fixture.create_subdir("Images");
    fixture.create_file("photo.png", "png");
    fixture.create_file("notes.txt", "notes");

    fixture.organize();
    fixture.undo();

    fixture.assert_file_exists("photo.png");
    fixture.assert_file_exists("notes.txt");
    fixture.assert_dir_exists("Images");
    fixture.assert_not_exists("Text");
}

// ============================================================================
// Entry kinds
// ============================================================================

#[test]
fn test_dotfiles_are_organized_and_restored() {
    let fixture = TestFixture::new();
    fixture.create_file(".env", "SECRET=1");
    fixture.create_file(".profile.txt", "profile");
    let before = fixture.snapshot();

    fixture.organize();

    fixture.assert_file_exists("Others/.env");
    fixture.assert_file_exists("Text/.profile.txt");
    fixture.assert_file_exists(SIDECAR_FILE_NAME);
    assert_eq!(fixture.sidecar().unwrap().len(), 2);

    fixture.undo();

    assert_eq!(fixture.snapshot(), before);
    fixture.assert_not_exists(SIDECAR_FILE_NAME);
}

#[test]
fn test_sidecar_is_never_organized() {
    let fixture = TestFixture::new();
    fixture.create_file("a.txt", "a");
    fixture.organize();

    fixture.create_file("b.txt", "b");
    fixture.organize();

    fixture.assert_file_exists(SIDECAR_FILE_NAME);
    fixture.assert_not_exists(&format!("Others/{}", SIDECAR_FILE_NAME));
    assert_eq!(fixture.sidecar().unwrap().len(), 2);
}

#[cfg(unix)]
#[test]
fn test_symlinks_follow_what_they_point_to() {
    use std::os::unix::fs::symlink;

    let fixture = TestFixture::new();
    let outside = TempDir::new().expect("Failed to create outside directory");
    fs::write(outside.path().join("real.pdf"), "pdf").unwrap();
    symlink(outside.path().join("real.pdf"), fixture.path().join("link.pdf")).unwrap();
    symlink(outside.path(), fixture.path().join("shortcut")).unwrap();

    fixture.organize();

    let moved = fixture.path().join("Documents/link.pdf");
    assert!(fs::symlink_metadata(&moved).unwrap().file_type().is_symlink());
    assert_eq!(fs::read_to_string(&moved).unwrap(), "pdf");
    assert!(fs::symlink_metadata(fixture.path().join("shortcut")).is_ok());
    fixture.assert_not_exists("Others");

    fixture.undo();

    let restored = fixture.path().join("link.pdf");
    assert!(fs::symlink_metadata(&restored).unwrap().file_type().is_symlink());
    assert!(outside.path().join("real.pdf").is_file());
}

#[test]
fn test_failed_entry_is_reported_and_the_rest_still_move() {
    let fixture = TestFixture::new();
    // a file named "Others" has no extension and blocks its own category folder
    fixture.create_file("Others", "blocker");
    fixture.create_file("notes.txt", "notes");
    fixture.create_file("a.png", "png");

    let result = fixture.run(OrganizeCommand::Organize { dry_run: false });

    assert!(result.is_ok());
    assert_eq!(fixture.read("Others"), "blocker");
    fixture.assert_file_exists("Text/notes.txt");
    fixture.assert_file_exists("Images/a.png");
    let log = fixture.sidecar().expect("sidecar should exist");
    assert_eq!(log.len(), 2);
    assert!(
        log.records()
            .iter()
            .all(|r| r.from != fixture.path().join("Others"))
    );

    fixture.undo();

    fixture.assert_file_exists("notes.txt");
    fixture.assert_file_exists("a.png");
    fixture.assert_file_exists("Others");
}
