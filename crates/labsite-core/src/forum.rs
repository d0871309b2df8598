//! Forum sessions shown on the public forum pages.
//!
//! The catalog is compiled in; sessions are not stored in the database.

use serde::Serialize;

/// A recorded forum session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Forum {
    pub id: &'static str,
    pub title: &'static str,
    pub image: &'static str,
    pub date: &'static str,
    pub host: &'static str,
    /// Comma-separated speaker names
    pub speaker: &'static str,
    pub description: &'static str,
    /// Bilibili video id of the recording
    pub bilibili_id: &'static str,
}

impl Forum {
    pub fn speakers(&self) -> impl Iterator<Item = &'static str> {
        self.speaker.split(',').map(str::trim).filter(|s| !s.is_empty())
    }

    /// Embeddable player URL for the recording.
    pub fn player_url(&self) -> String {
        format!(
            "https://player.bilibili.com/player.html?bvid={}&page=1&high_quality=1&danmaku=0",
            self.bilibili_id
        )
    }
}

/// Every forum session, newest first.
pub static FORUMS: [Forum; 6] = [
    Forum {
        id: "forum-1",
        title: "Advanced Materials Characterization Techniques in Modern Research",
        image: "/media-report-1.png",
        date: "2024-03-15 14:00-16:00",
        host: "Dr. Bo Da",
        speaker: "Prof. John Smith, Dr. Alice Wang",
        description: "Electron microscopy, X-ray diffraction and spectroscopy applied to \
                      nanomaterials, semiconductor devices and quantum materials.",
        bilibili_id: "BV1xx411c7mD",
    },
    Forum {
        id: "forum-2",
        title: "Quantum Materials and Their Applications in Next-Generation Devices",
        image: "/media-report-2a.png",
        date: "2024-02-20 10:00-12:00",
        host: "Prof. Chen Wei",
        speaker: "Dr. Bo Da, Dr. Sarah Johnson",
        description: "Properties and synthesis of quantum materials and their use in \
                      quantum computing, communication and sensing.",
        bilibili_id: "BV1yy4y1e7VN",
    },
    Forum {
        id: "forum-3",
        title: "Surface Analysis Methods for Nanomaterial Research",
        image: "/media-report-3.png",
        date: "2024-01-10 15:00-17:00",
        host: "Dr. Liu Ming",
        speaker: "Dr. Bo Da",
        description: "XPS, AES and SIMS for probing surface structure and chemistry of \
                      nanomaterials, including the virtual substrate method.",
        bilibili_id: "BV1xx411c7mD",
    },
    Forum {
        id: "forum-4",
        title: "Semiconductor Device Physics and Manufacturing",
        image: "/media-report-1.png",
        date: "2023-12-05 13:00-15:00",
        host: "Prof. Wang Lei",
        speaker: "Dr. Michael Brown, Dr. Emily Chen",
        description: "Device physics, fabrication and optimization of wide-bandgap, power \
                      and optoelectronic semiconductor devices.",
        bilibili_id: "BV1yy4y1e7VN",
    },
    Forum {
        id: "forum-5",
        title: "Electron Microscopy in Materials Science: From Basics to Advanced Applications",
        image: "/media-report-2b.png",
        date: "2023-11-18 09:00-11:00",
        host: "Dr. Zhang Hua",
        speaker: "Prof. David Park, Dr. Bo Da",
        description: "SEM and TEM fundamentals through high-resolution imaging, EELS \
                      and EDX.",
        bilibili_id: "BV1xx411c7mD",
    },
    Forum {
        id: "forum-6",
        title: "Nanophotonics and Optical Properties of Low-Dimensional Materials",
        image: "/media-report-2c.png",
        date: "2023-10-22 14:30-16:30",
        host: "Prof. Li Jian",
        speaker: "Dr. Anna Martinez, Dr. Robert Kim",
        description: "Optical behaviour of 2D materials, quantum dots and nanowires, and \
                      photonic devices built on them.",
        bilibili_id: "BV1yy4y1e7VN",
    },
];

/// Look up a forum session by its id.
pub fn find_forum(id: &str) -> Option<&'static Forum> {
    FORUMS.iter().find(|f| f.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_forum() {
        assert_eq!(find_forum("forum-3").unwrap().host, "Dr. Liu Ming");
        assert!(find_forum("forum-7").is_none());
        assert!(find_forum("").is_none());
    }

    #[test]
    fn test_ids_are_unique() {
        for (i, forum) in FORUMS.iter().enumerate() {
            assert!(FORUMS[i + 1..].iter().all(|f| f.id != forum.id), "{}", forum.id);
        }
    }

    #[test]
    fn test_speakers_split() {
        let forum = find_forum("forum-1").unwrap();
        let speakers: Vec<_> = forum.speakers().collect();
        assert_eq!(speakers, ["Prof. John Smith", "Dr. Alice Wang"]);
        assert!(forum.player_url().contains("bvid=BV1xx411c7mD"));
    }
}
