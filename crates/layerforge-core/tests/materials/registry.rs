use layerforge_core::{Error, MaterialId, MaterialProfile, MaterialRegistry};

#[test]
fn test_material_id_display() {
    let id = MaterialId(3);
    assert_eq!(id.to_string(), "material#3");
}

#[test]
fn test_profile_offsets() {
    let profile = MaterialProfile::new("pla", 0.5, 1.0);
    assert_eq!(profile.border_offset(), -0.25);
    assert_eq!(profile.hatch_offset(), -0.75);
}

#[test]
fn test_profile_validation() {
    assert!(MaterialProfile::default().validate().is_ok());
    assert!(MaterialProfile::new("", 0.4, 0.8).validate().is_err());
    assert!(MaterialProfile::new("pla", 0.0, 0.8).validate().is_err());
    assert!(MaterialProfile::new("pla", 0.4, -1.0).validate().is_err());
}

#[test]
fn test_registry_register_and_get() {
    let mut registry = MaterialRegistry::new();
    let pla = registry.register(MaterialProfile::new("pla", 0.4, 0.8));
    let petg = registry.register(MaterialProfile::new("petg", 0.5, 1.0));

    assert_ne!(pla, petg);
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.get(petg).map(|p| p.extrusion_width).ok(), Some(0.5));
    assert_eq!(registry.find_by_name("pla"), Some(pla));
    assert_eq!(registry.find_by_name("abs"), None);
}

#[test]
fn test_registry_reregister_keeps_handle() {
    let mut registry = MaterialRegistry::new();
    let first = registry.register(MaterialProfile::new("pla", 0.4, 0.8));
    let second = registry.register(MaterialProfile::new("pla", 0.45, 0.9));

    assert_eq!(first, second);
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.get(first).map(|p| p.extrusion_width).ok(), Some(0.45));
}

#[test]
fn test_registry_unknown_material() {
    let mut registry = MaterialRegistry::new();
    let id = registry.register(MaterialProfile::default());
    assert!(registry.remove(id).is_some());
    assert!(registry.is_empty());

    match registry.get(id) {
        Err(Error::UnknownMaterial(missing)) => assert_eq!(missing, id),
        other => panic!("expected unknown material, got {:?}", other),
    }
}

#[test]
fn test_registry_iter_is_ordered() {
    let mut registry = MaterialRegistry::new();
    registry.register(MaterialProfile::new("a", 0.4, 0.8));
    registry.register(MaterialProfile::new("b", 0.4, 0.8));
    registry.register(MaterialProfile::new("c", 0.4, 0.8));

    let names: Vec<_> = registry.iter().map(|(_, p)| p.name.clone()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}
