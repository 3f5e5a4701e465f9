use atomfs_core::{with_instance, Config, Instance, IoOp, StoreError};
use std::fs;

#[test]
fn open_creates_root_and_atoms_directories() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::new(dir.path().join("nested").join("store"));

    let instance = Instance::open(config.clone()).unwrap();

    assert!(config.root_path().is_dir());
    assert!(config.atoms_path().is_dir());
    assert!(config.db_path().is_file());
    instance.close().unwrap();
}

#[cfg(unix)]
#[test]
fn open_creates_root_with_private_mode() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let config = Config::new(dir.path().join("store"));
    Instance::open(config.clone()).unwrap().close().unwrap();

    let mode = fs::metadata(config.root_path()).unwrap().permissions().mode();
    assert_eq!(mode & 0o022, 0);
}

#[test]
fn open_accepts_existing_root() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::new(dir.path());

    Instance::open(config.clone()).unwrap().close().unwrap();
    let reopened = Instance::open(config).unwrap();
    assert!(reopened.atoms().unwrap().is_empty());
    reopened.close().unwrap();
}

#[test]
fn open_fails_when_root_is_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("occupied");
    fs::write(&path, b"not a directory").unwrap();

    let err = Instance::open(Config::new(&path)).err().unwrap();

    assert!(matches!(
        err,
        StoreError::Io {
            op: IoOp::CreateDir,
            ..
        }
    ));
}

#[test]
fn state_persists_across_instances() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::new(dir.path().join("store"));

    let hash = with_instance(config.clone(), |instance| {
        let atom = instance.put_atom(b"persisted")?;
        instance.create_molecule("m", &[atom.hash.clone()])?;
        Ok(atom.hash)
    })
    .unwrap();

    let atoms = with_instance(config, |instance| {
        Ok(instance.get_molecule("m")?.atoms)
    })
    .unwrap();
    assert_eq!(atoms, vec![hash]);
}

#[test]
fn independent_instances_do_not_share_state() {
    let dir = tempfile::tempdir().unwrap();
    let first = Instance::open(Config::new(dir.path().join("one"))).unwrap();
    let second = Instance::open(Config::new(dir.path().join("two"))).unwrap();

    first.put_atom(b"only in first").unwrap();

    assert_eq!(first.atoms().unwrap().len(), 1);
    assert!(second.atoms().unwrap().is_empty());
    first.close().unwrap();
    second.close().unwrap();
}

#[test]
fn with_instance_returns_operation_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = with_instance(Config::new(dir.path()), |instance| {
        instance.delete_molecule("ghost")
    })
    .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn put_atom_is_idempotent_for_same_content() {
    let dir = tempfile::tempdir().unwrap();
    let instance = Instance::open(Config::new(dir.path())).unwrap();

    let first = instance.put_atom(b"same").unwrap();
    let second = instance.put_atom(b"same").unwrap();

    assert_eq!(first, second);
    assert_eq!(instance.atoms().unwrap().len(), 1);
}

#[test]
fn snapshot_delete_collect_check_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let instance = Instance::open(Config::new(dir.path().join("store"))).unwrap();
    let h1 = instance.put_atom(b"rootfs base").unwrap().hash;
    let h2 = instance.put_atom(b"application layer").unwrap().hash;
    instance
        .create_molecule("base", &[h1.clone(), h2.clone()])
        .unwrap();

    let snap = instance.copy_molecule("snap1", "base").unwrap();
    assert_eq!(snap.atoms, vec![h1.clone(), h2.clone()]);

    instance.delete_molecule("base").unwrap();
    let report = instance.gc(false).unwrap();
    assert!(report.pruned_atoms.is_empty());
    assert!(report.removed_files.is_empty());

    let remaining: Vec<_> = instance
        .atoms()
        .unwrap()
        .into_iter()
        .map(|atom| atom.hash)
        .collect();
    assert!(remaining.contains(&h1));
    assert!(remaining.contains(&h2));
    assert!(instance.fsck().unwrap().is_empty());
    instance.close().unwrap();
}
