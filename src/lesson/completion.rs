// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Lesson completion tracking.

use crate::model::{Chapter, LessonType};

/// Fraction of the completion-bearing chapter that must have played before a
/// lesson counts as complete. The comparison is strict.
pub const COMPLETION_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionDecision {
    /// The duration is not known yet.
    NotEvaluable,
    /// The update is for a chapter that does not decide completion.
    NotBearing,
    NotReached,
    /// The threshold was crossed just now; the lesson should be marked.
    Reached,
    /// Completion has already been decided for this lesson.
    AlreadyComplete,
}

/// Watches status updates and reports the first one that completes the
/// lesson.
#[derive(Debug, Clone, Copy)]
pub struct CompletionTracker {
    bearing: Option<Chapter>,
    complete: bool,
}

impl CompletionTracker {
    pub fn new(lesson_type: LessonType, already_complete: bool) -> Self {
        Self {
            bearing: lesson_type.completion_chapter(),
            complete: already_complete,
        }
    }

    pub fn bearing_chapter(&self) -> Option<Chapter> {
        self.bearing
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Records that the lesson is already complete elsewhere.
    pub fn mark_complete(&mut self) {
        self.complete = true;
    }

    pub fn observe(
        &mut self,
        chapter: Chapter,
        position_ms: u64,
        duration_ms: u64,
    ) -> CompletionDecision {
        if self.complete {
            return CompletionDecision::AlreadyComplete;
        }
        if self.bearing != Some(chapter) {
            return CompletionDecision::NotBearing;
        }
        if duration_ms == 0 {
            return CompletionDecision::NotEvaluable;
        }

        let fraction = position_ms as f64 / duration_ms as f64;
        if fraction > COMPLETION_THRESHOLD {
            self.complete = true;
            CompletionDecision::Reached
        } else {
            CompletionDecision::NotReached
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_half_does_not_complete() {
        let mut tracker = CompletionTracker::new(LessonType::StandardDbs, false);
        assert_eq!(
            tracker.observe(Chapter::Application, 50_000, 100_000),
            CompletionDecision::NotReached
        );
        assert!(!tracker.is_complete());
    }

    #[test]
    fn just_past_half_completes_once() {
        let mut tracker = CompletionTracker::new(LessonType::StandardDbs, false);
        assert_eq!(
            tracker.observe(Chapter::Application, 50_001, 100_000),
            CompletionDecision::Reached
        );
        assert_eq!(
            tracker.observe(Chapter::Application, 90_000, 100_000),
            CompletionDecision::AlreadyComplete
        );
    }

    #[test]
    fn zero_duration_is_not_evaluable() {
        let mut tracker = CompletionTracker::new(LessonType::VideoOnly, false);
        assert_eq!(
            tracker.observe(Chapter::Training, 10_000, 0),
            CompletionDecision::NotEvaluable
        );
        assert!(!tracker.is_complete());
    }

    #[test]
    fn only_the_bearing_chapter_counts() {
        let mut tracker = CompletionTracker::new(LessonType::StandardDmc, false);
        assert_eq!(
            tracker.observe(Chapter::Training, 90_000, 100_000),
            CompletionDecision::NotBearing
        );
        assert_eq!(
            tracker.observe(Chapter::Story, 90_000, 100_000),
            CompletionDecision::NotBearing
        );
    }

    #[test]
    fn bearing_chapter_per_lesson_type() {
        assert_eq!(
            CompletionTracker::new(LessonType::VideoOnly, false).bearing_chapter(),
            Some(Chapter::Training)
        );
        assert_eq!(
            CompletionTracker::new(LessonType::Audiobook, false).bearing_chapter(),
            Some(Chapter::Story)
        );
        assert_eq!(
            CompletionTracker::new(LessonType::Book, false).bearing_chapter(),
            None
        );
    }

    #[test]
    fn previously_complete_lesson_never_fires() {
        let mut tracker = CompletionTracker::new(LessonType::Audiobook, true);
        assert_eq!(
            tracker.observe(Chapter::Story, 99_000, 100_000),
            CompletionDecision::AlreadyComplete
        );
    }
}
