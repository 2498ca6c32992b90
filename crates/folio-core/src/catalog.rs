#![forbid(unsafe_code)]

//! Static music catalog.
//!
//! The catalog is media-collaborator data: fixed at load time and never
//! mutated. Song buttons in the markup reference tracks by [`Track::id`].

/// One radio station / track the music player can load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Track {
    pub id: &'static str,
    pub genre: &'static str,
    pub title: &'static str,
    pub cover: &'static str,
    pub source: &'static str,
    pub description: &'static str,
}

pub const CATALOG: &[Track] = &[
    Track {
        id: "cyber-dreams",
        genre: "Hip Hop",
        title: "FLO NAZER",
        cover: "imgs/ALBUMS/phoneoe copy.gif",
        source: "music/hip-hop.mp3",
        description: "This is Hip Hop radio - FLO NAZER. All songs produced & composed by The Prophitt.",
    },
    Track {
        id: "neon-nights",
        genre: "Smooth Jazz",
        title: "SECRETLY CANADIAN",
        cover: "imgs/ALBUMS/GUITAR.png",
        source: "music/smooth-jazz.mp3",
        description: "This is Smooth Jazz radio - SECRETLY CANADIAN. All songs produced & composed by The Prophitt.",
    },
    Track {
        id: "digital-rain",
        genre: "Ambient",
        title: "3DSXLHACKS",
        cover: "imgs/ALBUMS/STARR.png",
        source: "music/ambient.mp3",
        description: "This is Ambient radio - 3DSXLHACKS. All songs produced & composed by The Prophitt.",
    },
    Track {
        id: "retro-wave",
        genre: "House",
        title: "REFRIDGERATOR RUNNIN",
        cover: "imgs/ALBUMS/hand.gif",
        source: "music/refridgerator_runnin_101 HOUSE.mp3",
        description: "House Track -+> REFRIDGERATOR RUNNIN. All songs produced & composed by The Prophitt. Better go catch it!",
    },
    Track {
        id: "synthwave",
        genre: "Techno",
        title: "REMOTE CONTROL THIEF",
        cover: "imgs/ALBUMS/UFO.png",
        source: "music/techno.mp3",
        description: "This is Techno radio - REMOTE CONTROL THIEF. All songs produced & composed by The Prophitt.",
    },
    Track {
        id: "lo-fi-beats",
        genre: "Pop",
        title: "CRINGE-WORTHY",
        cover: "imgs/ALBUMS/SUNNY.png",
        source: "music/pop.mp3",
        description: "This is Pop radio - CRINGE-WORTHY. All songs produced & composed by The Prophitt.",
    },
    Track {
        id: "synthpop",
        genre: "Dance",
        title: "CLASSIC REGULAR",
        cover: "imgs/ALBUMS/JUMP.png",
        source: "music/dance.mp3",
        description: "This is Dance radio - CLASSIC REGULAR. All songs produced & composed by The Prophitt.",
    },
    Track {
        id: "chillwave",
        genre: "Funk",
        title: "SHIVA, BABY",
        cover: "imgs/ALBUMS/IDKK.png",
        source: "music/shivababy_funk_100_2.mp3",
        description: "This is Funk radio - SHIVA, BABY. All songs produced & composed by The Prophitt.",
    },
    Track {
        id: "cyberpunk",
        genre: "Indie",
        title: "COSMIC WAFFLE HOUSE",
        cover: "imgs/ALBUMS/ZOMBI.png",
        source: "music/Cosmic Waffle House_Indie_154.mp3",
        description: "Indie Track -+> COSMIC WAFFLE HOUSE. All songs produced & composed by The Prophitt.",
    },
];

/// Look up a track by id.
#[must_use]
pub fn find(id: &str) -> Option<&'static Track> {
    CATALOG.iter().find(|track| track.id == id)
}
