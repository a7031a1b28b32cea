use crate::service::common_structs::{Emotion, Song, SongId};

const COVER: &str = "🎵";

// (id, title, artist, genre, duration)
type Entry = (u64, &'static str, &'static str, &'static str, &'static str);

const HAPPY: [Entry; 5] = [
    (1, "Happy", "Pharrell Williams", "Pop", "3:53"),
    (2, "Good Time", "Owl City", "Pop", "3:26"),
    (3, "Walking on Sunshine", "Katrina & The Waves", "Rock", "4:00"),
    (4, "I Gotta Feeling", "The Black Eyed Peas", "Pop", "4:05"),
    (5, "Shake It Off", "Taylor Swift", "Pop", "3:39"),
];

const SAD: [Entry; 5] = [
    (6, "Mad World", "Gary Jules", "Alternative", "3:09"),
    (7, "Hallelujah", "Jeff Buckley", "Folk", "6:53"),
    (8, "Fix You", "Coldplay", "Alternative", "4:55"),
    (9, "The Scientist", "Coldplay", "Alternative", "5:09"),
    (10, "Skinny Love", "Bon Iver", "Indie", "3:58"),
];

const ANGRY: [Entry; 5] = [
    (11, "In The End", "Linkin Park", "Rock", "3:36"),
    (12, "Numb", "Linkin Park", "Rock", "3:05"),
    (13, "Break Stuff", "Limp Bizkit", "Rock", "2:46"),
    (14, "Given Up", "Linkin Park", "Rock", "3:09"),
    (15, "Rollin'", "Limp Bizkit", "Rock", "3:35"),
];

const NEUTRAL: [Entry; 5] = [
    (16, "Clocks", "Coldplay", "Alternative", "5:07"),
    (17, "Yellow", "Coldplay", "Alternative", "4:29"),
    (18, "Wonderwall", "Oasis", "Rock", "4:18"),
    (19, "Creep", "Radiohead", "Alternative", "4:19"),
    (20, "Boulevard of Broken Dreams", "Green Day", "Rock", "4:20"),
];

const SURPRISED: [Entry; 5] = [
    (21, "Uptown Funk", "Mark Ronson ft. Bruno Mars", "Pop", "3:57"),
    (22, "Can't Stop the Feeling!", "Justin Timberlake", "Pop", "3:56"),
    (23, "Shake It Off", "Taylor Swift", "Pop", "3:39"),
    (24, "Happy", "Pharrell Williams", "Pop", "3:53"),
    (25, "Firework", "Katy Perry", "Pop", "3:47"),
];


/// Fixed songs for a mood label; labels outside the five moods get the neutral set.
pub fn fallback_songs(mood: &str) -> Vec<Song> {
    let entries = match Emotion::from_label(mood) {
        Some(Emotion::Happy) => &HAPPY,
        Some(Emotion::Sad) => &SAD,
        Some(Emotion::Angry) => &ANGRY,
        Some(Emotion::Surprised) => &SURPRISED,
        _ => &NEUTRAL,
    };

    entries
        .iter()
        .map(|(id, title, artist, genre, duration)| Song {
            id: SongId::Index(*id),
            title: (*title).to_owned(),
            artist: (*artist).to_owned(),
            genre: (*genre).to_owned(),
            duration: (*duration).to_owned(),
            cover: COVER.to_owned(),
            preview_url: None,
            spotify_url: None,
        })
        .collect()
}
