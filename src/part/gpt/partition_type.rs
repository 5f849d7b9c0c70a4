use uuid::Uuid;
use uuid_macros::uuid;

/// Human readable name of a well-known GPT partition type GUID.
pub fn partition_type_name(type_guid: &Uuid) -> Option<&'static str> {
    let known = [
        (uuid!("C12A7328-F81F-11D2-BA4B-00A0C93EC93B"), "EFI System"),
        (uuid!("21686148-6449-6E6F-744E-656564454649"), "BIOS boot"),
        (uuid!("EBD0A0A2-B9E5-4433-87C0-68B6B72699C7"), "Microsoft basic data"),
        (uuid!("0FC63DAF-8483-4772-8E79-3D69D8477DE4"), "Linux filesystem"),
        (uuid!("FE3A2A5D-4F32-41A7-B725-ACCC3285A309"), "ChromeOS kernel"),
        (uuid!("3CB8E202-3B7E-47DD-8A3C-7FF2A13CFCEC"), "ChromeOS root filesystem"),
    ];

    known
        .iter()
        .find(|(guid, _)| guid == type_guid)
        .map(|(_, name)| *name)
}

#[cfg(test)]
#[test]
fn test_partition_type_name() {
    crate::tests_init();

    assert_eq!(
        partition_type_name(&crate::testing::chromeos_kernel()),
        Some("ChromeOS kernel")
    );
    assert_eq!(
        partition_type_name(&crate::testing::linux_filesystem()),
        Some("Linux filesystem")
    );
    assert_eq!(partition_type_name(&Uuid::nil()), None);
}
