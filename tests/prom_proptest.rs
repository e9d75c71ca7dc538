//! Property-based tests for PROM encoding and COE export.

use prom::prom::{DEVICE_TAG, DMA_EXT_TAG, DMA_TAG, END_TAG};
use prom::{
    append_checksum, check_checksum, checksum16, dump_coe, dump_device_description, dump_header,
    dump_memory_description, is_checksum_valid, MemoryRange, Permission, PromImage, READ_PERM,
    WRITE_PERM,
};
use proptest::prelude::*;

fn region_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,15}"
}

fn permission_bits() -> impl Strategy<Value = u8> {
    prop_oneof![
        Just(0),
        Just(READ_PERM),
        Just(WRITE_PERM),
        Just(READ_PERM | WRITE_PERM),
    ]
}

proptest! {
    #[test]
    fn appended_checksum_always_verifies(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let blob = append_checksum(&data);
        prop_assert!(is_checksum_valid(&blob));
        prop_assert_eq!(&blob[..data.len()], &data[..]);
    }

    #[test]
    fn corrupted_byte_is_detected(
        data in prop::collection::vec(any::<u8>(), 1..256),
        index in any::<prop::sample::Index>(),
        flip in 1u8..=255,
    ) {
        let mut blob = append_checksum(&data);
        let i = index.index(blob.len());
        blob[i] ^= flip;
        prop_assert!(check_checksum(&blob).is_err());
    }

    #[test]
    fn device_record_layout(name in "[ -~]{0,254}") {
        let record = dump_device_description(&name).unwrap();
        prop_assert_eq!(record.len(), 2 + name.len() + 1);
        prop_assert_eq!(record[0], DEVICE_TAG);
        prop_assert_eq!(record[1] as usize, name.len() + 1);
        prop_assert_eq!(*record.last().unwrap(), 0);
    }

    #[test]
    fn memory_width_follows_values(
        name in region_name(),
        base in any::<u64>(),
        size in any::<u64>(),
        perm in permission_bits(),
    ) {
        let record = dump_memory_description(&name, base, size, perm).unwrap();
        let narrow = base < (1 << 48) && size <= u32::MAX as u64;
        let (tag, range_len) = if narrow { (DMA_TAG, 10) } else { (DMA_EXT_TAG, 16) };

        prop_assert_eq!(record[0], tag);
        prop_assert_eq!(MemoryRange::new(base, size).tag(), tag);
        prop_assert_eq!(record[1] as usize, range_len + 1 + name.len() + 1);
        prop_assert_eq!(record.len(), 2 + record[1] as usize);
        prop_assert_eq!(record[2 + range_len], perm);
    }

    #[test]
    fn built_image_is_well_framed(
        device in region_name(),
        regions in prop::collection::vec(
            (region_name(), any::<u64>(), any::<u64>(), permission_bits()),
            0..8,
        ),
    ) {
        let mut image = PromImage::new(&device);
        for (name, base, size, perm) in &regions {
            let permission = Permission::from_bits(*perm).unwrap();
            image.add_memory(name, *base, *size, permission).unwrap();
        }
        let bytes = image.to_bytes().unwrap();

        let header = dump_header();
        prop_assert_eq!(&bytes[..5], &header[..]);
        prop_assert_eq!(bytes.len() % 2, 0);
        prop_assert!(is_checksum_valid(&bytes));
        prop_assert_eq!(checksum16(&bytes), 0);

        // Walk the records by their length bytes down to the end record.
        let mut pos = 5;
        let mut records = 0;
        while bytes[pos] != END_TAG {
            pos += 2 + bytes[pos + 1] as usize;
            records += 1;
        }
        prop_assert_eq!(records, image.record_count());
        prop_assert_eq!(pos + 2 + bytes[pos + 1] as usize, bytes.len());
    }

    #[test]
    fn coe_has_one_word_per_group(
        data in prop::collection::vec(any::<u8>(), 1..128),
        group_size in 1usize..9,
    ) {
        let coe = dump_coe(&data, group_size).unwrap();
        let body = coe.lines().nth(2).unwrap();
        let body = body.strip_suffix(';').unwrap();
        let words: Vec<&str> = body.split(", ").collect();

        prop_assert_eq!(words.len(), data.len().div_ceil(group_size));
        for word in &words {
            prop_assert_eq!(word.len(), group_size * 2);
        }
        let first: String = data[..group_size.min(data.len())]
            .iter()
            .rev()
            .map(|b| format!("{:02x}", b))
            .collect();
        prop_assert!(words[0].ends_with(&first));
    }
}
