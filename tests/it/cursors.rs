use veneer::error::Error;
use veneer::read::{read_metadata, scan_pages, ColumnCursor, PageCursor};
use veneer::source::ByteSource;
use veneer::{FileReader, FileState, Fleet};

use super::util::*;

#[test]
fn scan_finds_every_page_and_value() {
    let source = ByteSource::from_vec(delta_file(0));
    let metadata = read_metadata(&source).unwrap();
    let chunk = metadata.row_groups[0].column(0);

    let pages = scan_pages(chunk, &source).unwrap();
    assert_eq!(pages.len(), 2);
    let total: usize = pages.iter().map(|page| page.num_values).sum();
    assert_eq!(total as i64, chunk.num_values());
}

#[test]
fn consumed_slots_are_released_and_length_is_preserved() {
    let source = ByteSource::from_vec(delta_file(0));
    let metadata = read_metadata(&source).unwrap();
    let chunk = metadata.row_groups[0].column(0);

    let mut cursor = PageCursor::from_chunk(chunk, &source).unwrap();
    assert!(cursor.num_slots() > 0);
    let num_slots = cursor.num_slots();

    let mut decoded_values = 0;
    let mut consumed = 0;
    while cursor.has_next() {
        let page = cursor.next_page().unwrap();
        decoded_values += page.num_values;
        consumed += 1;
        // every slot up to the consumption point is released, the rest intact
        for slot in 0..consumed {
            assert!(cursor.is_consumed(slot));
        }
        for slot in consumed..num_slots {
            assert!(!cursor.is_consumed(slot));
        }
        assert_eq!(cursor.num_slots(), num_slots);
    }
    assert_eq!(decoded_values as i64, chunk.num_values());
    assert_eq!(consumed, num_slots);
}

#[test]
fn consuming_past_the_end_is_an_index_error() {
    let source = ByteSource::from_vec(delta_file(0));
    let metadata = read_metadata(&source).unwrap();
    let chunk = metadata.row_groups[0].column(0);

    let mut cursor = PageCursor::from_chunk(chunk, &source).unwrap();
    while cursor.has_next() {
        cursor.next_page().unwrap();
    }
    assert!(matches!(
        cursor.next_page(),
        Err(Error::IndexOutOfRange(_))
    ));
}

#[test]
fn closed_cursor_refuses_to_decode() {
    let source = ByteSource::from_vec(delta_file(0));
    let metadata = read_metadata(&source).unwrap();
    let chunk = metadata.row_groups[0].column(0);

    let mut cursor = PageCursor::from_chunk(chunk, &source).unwrap();
    cursor.close();
    assert!(!cursor.has_next());
    assert!(matches!(cursor.next_page(), Err(Error::Closed)));
}

#[test]
fn extend_continues_into_another_file_without_a_rescan() {
    let first = ByteSource::from_vec(delta_file(0));
    let second = ByteSource::from_vec(delta_file(150));

    let metadata = read_metadata(&first).unwrap();
    let chunk = metadata.row_groups[0].column(0);
    let mut cursor = PageCursor::from_chunk(chunk, &first).unwrap();

    // the second file's descriptors come from a separately prepared state
    let state = FileState::from_source("second".into(), second).unwrap();
    cursor.extend(state.chunk_pages[0][0].clone(), state.source.clone());
    assert_eq!(cursor.num_slots(), 4);

    let mut values = 0;
    while cursor.has_next() {
        values += cursor.next_page().unwrap().num_values;
    }
    assert_eq!(values, 300);
    assert_eq!(cursor.num_slots(), 4);
    assert!((0..4).all(|slot| cursor.is_consumed(slot)));
}

#[test]
fn column_cursor_drains_queued_chunks_in_order() {
    let first = ByteSource::from_vec(delta_file(0));
    let second = ByteSource::from_vec(delta_file(150));

    let mut column = ColumnCursor::new();
    for source in [&first, &second] {
        let metadata = read_metadata(source).unwrap();
        let chunk = metadata.row_groups[0].column(0);
        column.push_cursor(PageCursor::from_chunk(chunk, source).unwrap());
    }

    let mut pages = 0;
    let mut values = 0;
    while column.has_next() {
        let page = column.next_page().unwrap();
        pages += 1;
        values += page.num_values;
    }
    assert_eq!(pages, 4);
    assert_eq!(values, 300);
    assert!(matches!(
        column.next_page(),
        Err(Error::IndexOutOfRange(_))
    ));
}

#[test]
fn reader_extends_across_prefetched_files() {
    let reader = FileReader::from_source(ByteSource::from_vec(delta_file(0))).unwrap();
    let mut rows = reader.row_reader().unwrap();

    let state =
        FileState::from_source("next".into(), ByteSource::from_vec(delta_file(150))).unwrap();
    rows.extend(&state).unwrap();

    let values = rows
        .map(|row| row.unwrap().get_int(0).unwrap())
        .collect::<Vec<_>>();
    assert_eq!(values, (0..300).collect::<Vec<_>>());
}

#[test]
fn extending_with_a_different_schema_is_a_mismatch() {
    let reader = FileReader::from_source(ByteSource::from_vec(delta_file(0))).unwrap();
    let mut rows = reader.row_reader().unwrap();

    let state = FileState::from_source(
        "other".into(),
        ByteSource::from_vec(three_column_gzip_file()),
    )
    .unwrap();
    assert!(matches!(
        rows.extend(&state),
        Err(Error::TypeMismatch(_))
    ));
}

#[test]
fn closed_reader_refuses_further_work() {
    let reader = FileReader::from_source(ByteSource::from_vec(delta_file(0))).unwrap();
    let mut rows = reader.row_reader().unwrap();
    rows.next().unwrap().unwrap();
    rows.close();
    assert!(matches!(rows.has_next(), Err(Error::Closed)));
    assert!(matches!(rows.next(), Some(Err(Error::Closed))));
}

#[test]
fn fleet_prepares_files_in_order() {
    let dir = std::env::temp_dir();
    let paths = (0..3)
        .map(|i| {
            let path = dir.join(format!("veneer-fleet-{}-{}.parquet", std::process::id(), i));
            std::fs::write(&path, delta_file(i * 150)).unwrap();
            path
        })
        .collect::<Vec<_>>();

    let mut fleet = Fleet::spawn(paths.clone(), 2);
    assert_eq!(fleet.remaining(), 3);

    let first = fleet.next_file().unwrap().unwrap();
    let reader = FileReader::from_source(first.source.clone()).unwrap();
    let mut rows = reader.row_reader().unwrap();
    while let Some(state) = fleet.next_file() {
        rows.extend(&state.unwrap()).unwrap();
    }

    let values = rows
        .map(|row| row.unwrap().get_int(0).unwrap())
        .collect::<Vec<_>>();
    assert_eq!(values, (0..450).collect::<Vec<_>>());

    for path in paths {
        std::fs::remove_file(path).unwrap();
    }
}
