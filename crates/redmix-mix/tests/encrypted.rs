//! Encrypted extended headers.

mod common;

#[cfg(feature = "encryption")]
mod with_encryption {
    use crate::common::{identity_public_key, sample, test_cipher_key, write_temp, Fixture};
    use redmix_mix::{ErrorKind, HeaderLayout, MixArchive, OpenOptions};

    fn options() -> OpenOptions {
        OpenOptions::new().public_key(identity_public_key())
    }

    #[test]
    fn test_encrypted_round_trip() {
        let fixture = sample();
        let bytes = fixture.encrypted(&test_cipher_key());
        assert_eq!(&bytes[..4], &[0x00, 0x00, 0x02, 0x00]);

        let file = write_temp(&bytes);
        let archive = options().open(file.path()).unwrap();

        assert_eq!(archive.layout(), HeaderLayout::ExtendedEncrypted);
        let flags = archive.format_flags();
        assert!(flags.is_extended && flags.is_encrypted && !flags.has_digest);
        assert_eq!(archive.entries(), fixture.entries().as_slice());
        // Prefix, key blob, then 66 header bytes padded to 72.
        assert_eq!(archive.data_region_offset(), 4 + 80 + 72);

        for (name, data) in &fixture.files {
            assert_eq!(&archive.read(name).unwrap(), data);
        }
    }

    #[test]
    fn test_encrypted_matches_plain_table() {
        let fixture = sample();
        let plain = MixArchive::open(write_temp(&fixture.standard()).path()).unwrap();
        let file = write_temp(&fixture.encrypted(&test_cipher_key()));
        let encrypted = options().open(file.path()).unwrap();
        assert_eq!(plain.entries(), encrypted.entries());
        assert_eq!(plain.total_data_size(), encrypted.total_data_size());
    }

    #[test]
    fn test_single_entry_header() {
        // 18 header bytes: one block decrypted up front, two more after.
        let fixture = Fixture::new(&[("ONLY.BIN", b"payload")]);
        let file = write_temp(&fixture.encrypted(&test_cipher_key()));
        let archive = options().open(file.path()).unwrap();
        assert_eq!(archive.entry_count(), 1);
        assert_eq!(archive.data_region_offset(), 4 + 80 + 24);
        assert_eq!(archive.read("only.bin").unwrap(), b"payload");
    }

    #[test]
    fn test_encrypted_with_digest() {
        let mut fixture = sample();
        fixture.digest = Some([0x5A; 20]);
        let bytes = fixture.encrypted(&test_cipher_key());
        assert_eq!(&bytes[..4], &[0x00, 0x00, 0x03, 0x00]);

        let archive = options().open(write_temp(&bytes).path()).unwrap();
        assert!(archive.format_flags().has_digest);
        assert_eq!(archive.read_digest().unwrap(), Some([0x5A; 20]));
    }

    #[test]
    fn test_wrong_public_key_fails() {
        let file = write_temp(&sample().encrypted(&test_cipher_key()));
        // The real exponent does not undo an identity-wrapped blob.
        assert!(MixArchive::open(file.path()).is_err());
    }

    #[test]
    fn test_truncated_key_blob() {
        let bytes = sample().encrypted(&test_cipher_key());
        let file = write_temp(&bytes[..50]);
        let err = options().open(file.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_zero_key_blob() {
        let mut bytes = vec![0x00, 0x00, 0x02, 0x00];
        bytes.extend_from_slice(&[0u8; 80]);
        bytes.extend_from_slice(&[0u8; 24]);
        let err = options().open(write_temp(&bytes).path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::KeyRecovery);
    }
}

#[cfg(not(feature = "encryption"))]
#[test]
fn test_encrypted_is_unsupported() {
    use common::write_temp;
    use redmix_mix::{ErrorKind, MixArchive};

    let mut bytes = vec![0x00, 0x00, 0x02, 0x00];
    bytes.extend_from_slice(&[0x11; 104]);
    let file = write_temp(&bytes);
    let err = MixArchive::open(file.path()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unsupported);
}
