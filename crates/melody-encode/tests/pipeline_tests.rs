//! End-to-end pipeline tests: songs in, framed corpus and metadata
//! out, then back again the way a training process would read them.

use std::fs;

use melody_encode::{
    decode, load_corpus, windows, CorpusBuilder, Duration, EncodingConfig, Event, Framing,
    Metadata, Song, Symbol,
};
use pretty_assertions::assert_eq;

fn note(pitch: u8, duration: Duration) -> Event {
    Event::Note { pitch, duration }
}

fn sample_songs() -> Vec<Song> {
    vec![
        Song::from_events(vec![
            note(64, Duration::EIGHTH),
            note(62, Duration::EIGHTH),
            note(60, Duration::QUARTER),
        ]),
        Song::from_events(vec![
            Event::Chord {
                label: "C".to_string(),
            },
            note(60, Duration::QUARTER),
            Event::Rest {
                duration: Duration::QUARTER,
            },
            note(67, Duration::HALF),
        ]),
    ]
}

fn small_config(framing: Framing) -> EncodingConfig {
    EncodingConfig {
        sequence_length: 4,
        framing,
        ..EncodingConfig::default()
    }
}

#[test]
fn preprocess_then_reload_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let corpus_path = dir.path().join("processed").join("corpus.txt");
    let metadata_path = dir.path().join("processed").join("metadata.json");

    let config = small_config(Framing::BoundaryRun);
    let corpus = CorpusBuilder::new(&config).build(&sample_songs());
    assert_eq!(corpus.kept, 2);
    assert_eq!(corpus.skipped, 0);

    let vocabulary = melody_encode::Vocabulary::build([corpus.symbols.as_slice()]);
    corpus.save(&corpus_path).unwrap();
    Metadata::from_vocabulary(&vocabulary, config.sequence_length, config.framing)
        .save(&metadata_path)
        .unwrap();

    // The training side of the fence sees only the two files.
    let reloaded_symbols = load_corpus(&corpus_path).unwrap();
    assert_eq!(reloaded_symbols, corpus.symbols);

    let metadata = Metadata::load(&metadata_path).unwrap();
    assert_eq!(metadata.sequence_length, 4);
    assert_eq!(metadata.framing, Framing::BoundaryRun);

    let rebuilt = metadata.to_vocabulary().unwrap();
    assert_eq!(rebuilt, vocabulary);

    let pairs = windows(&reloaded_symbols, &rebuilt, metadata.sequence_length).unwrap();
    assert_eq!(pairs.total(), reloaded_symbols.len() - 4);
}

#[test]
fn two_runs_write_byte_identical_files() {
    let dir = tempfile::tempdir().unwrap();

    let mut outputs = Vec::new();
    for run in ["first", "second"] {
        let corpus_path = dir.path().join(run).join("corpus.txt");
        let metadata_path = dir.path().join(run).join("metadata.json");

        let config = small_config(Framing::BoundaryRun);
        let corpus = CorpusBuilder::new(&config).build(&sample_songs());
        let vocabulary = melody_encode::Vocabulary::build([corpus.symbols.as_slice()]);

        corpus.save(&corpus_path).unwrap();
        Metadata::from_vocabulary(&vocabulary, config.sequence_length, config.framing)
            .save(&metadata_path)
            .unwrap();

        outputs.push((
            fs::read(&corpus_path).unwrap(),
            fs::read(&metadata_path).unwrap(),
        ));
    }

    assert_eq!(outputs[0].0, outputs[1].0, "corpus bytes differ");
    assert_eq!(outputs[0].1, outputs[1].1, "metadata bytes differ");
}

#[test]
fn boundary_runs_keep_windows_inside_one_piece() {
    let config = small_config(Framing::BoundaryRun);
    let corpus = CorpusBuilder::new(&config).build(&sample_songs());

    // Pitches of piece one and piece two never share a window unless a
    // boundary sits between them; the run is as long as the window.
    for window in corpus.symbols.windows(config.sequence_length) {
        let has_first = window.contains(&Symbol::Pitch(64));
        let has_second = window.contains(&Symbol::Pitch(67));
        if has_first && has_second {
            assert!(
                window.contains(&Symbol::Boundary),
                "window spans two pieces without a boundary: {window:?}"
            );
        }
    }
}

#[test]
fn stripping_boundaries_recovers_every_piece() {
    let config = small_config(Framing::BoundaryRun);
    let songs = sample_songs();
    let corpus = CorpusBuilder::new(&config).build(&songs);

    let pieces: Vec<Vec<Symbol>> = corpus
        .symbols
        .split(|symbol| *symbol == Symbol::Boundary)
        .filter(|piece| !piece.is_empty())
        .map(|piece| piece.to_vec())
        .collect();
    assert_eq!(pieces.len(), songs.len());

    for (piece, song) in pieces.iter().zip(&songs) {
        assert_eq!(decode(piece, config.step).unwrap(), *song);
    }
}

#[test]
fn start_end_framing_survives_the_metadata_trip() {
    let dir = tempfile::tempdir().unwrap();
    let metadata_path = dir.path().join("metadata.json");

    let config = small_config(Framing::StartEnd);
    let corpus = CorpusBuilder::new(&config).build(&sample_songs());
    assert_eq!(corpus.symbols.first(), Some(&Symbol::Start));
    assert_eq!(corpus.symbols.last(), Some(&Symbol::End));

    let vocabulary = melody_encode::Vocabulary::build([corpus.symbols.as_slice()]);
    Metadata::from_vocabulary(&vocabulary, config.sequence_length, config.framing)
        .save(&metadata_path)
        .unwrap();
    assert_eq!(
        Metadata::load(&metadata_path).unwrap().framing,
        Framing::StartEnd
    );

    // Stripping the markers leaves decodable pieces.
    let inner: Vec<Symbol> = corpus
        .symbols
        .iter()
        .filter(|symbol| !symbol.is_marker())
        .cloned()
        .collect();
    let merged = decode(&inner, config.step).unwrap();
    let expected: usize = sample_songs().iter().map(|song| song.events.len()).sum();
    assert_eq!(merged.events.len(), expected);
}

#[test]
fn normalized_corpus_sits_in_the_reference_key() {
    struct TowardMiddleC;

    impl melody_encode::KeyNormalizer for TowardMiddleC {
        fn semitone_shift(&self, song: &Song) -> i8 {
            // Toy rule: shift so the first note lands on C.
            song.events
                .iter()
                .find_map(|event| match event {
                    Event::Note { pitch, .. } => Some(((60 - i16::from(*pitch)) % 12) as i8),
                    _ => None,
                })
                .unwrap_or(0)
        }
    }

    let config = small_config(Framing::BoundaryRun);
    let songs = vec![Song::from_events(vec![
        note(62, Duration::QUARTER),
        note(66, Duration::QUARTER),
    ])];
    let normalizer = TowardMiddleC;
    let corpus = CorpusBuilder::new(&config)
        .with_normalizer(&normalizer)
        .build(&songs);

    assert_eq!(corpus.symbols[0], Symbol::Pitch(60));
    assert_eq!(corpus.symbols[4], Symbol::Pitch(64));
}
