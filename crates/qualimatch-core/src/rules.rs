//! Fixed rule tables for design-alignment inference and feedback.
//!
//! All patterns run against normalised text (lowercase, punctuation folded to
//! spaces, whitespace collapsed), so they never need to match punctuation.

use crate::model::{Design, Source};

/// Cue table and feedback material for one design.
#[derive(Debug)]
pub struct DesignRules {
    pub design: Design,
    /// Ordered cue patterns. Each one that matches contributes once.
    pub cues: &'static [&'static str],
    /// Highly design-specific phrases. A cue whose matched text contains one
    /// of these scores the strong weight.
    pub strong: &'static [&'static str],
    /// One-line rationale shown when this design is suggested.
    pub reason: &'static str,
    /// Data sources conventionally paired with this design (2–4).
    pub source_hints: &'static [Source],
    /// Example research questions; `{topic}` is replaced by the learner's topic.
    pub rewrites: &'static [&'static str],
}

/// One entry per design, in [`Design::ALL`] order.
pub static DESIGN_RULES: [DesignRules; 5] = [
    DesignRules {
        design: Design::Phenomenology,
        cues: &[
            r"\blived experiences?\b",
            r"\bexperienc(?:e|es|ed|ing)\b",
            r"\b(?:meaning|meanings|means to|make sense of|what \w+(?: \w+)? means?)\b",
            r"\b(?:feel|feels|feeling|feelings|emotions?)\b",
            r"\b(?:perceptions?|perceive|perspectives?|views?)\b",
            r"\b(?:challenges?|struggles?|stress|anxiety|pressure)\b",
            r"\b(?:coping|cope|deal with|manage)\b",
            r"\b(?:what is it like|essence)\b",
        ],
        strong: &["lived experience", "make sense of", "what is it like", "essence"],
        reason: "Words about lived experience, meaning, or feelings usually fit phenomenology.",
        source_hints: &[Source::Interview, Source::FocusGroup],
        rewrites: &[
            "How do Grade 11 learners in one section describe their lived experience of {topic} during this semester?",
            "What does {topic} mean to students in our school, and how do they make sense of it in daily class work?",
        ],
    },
    DesignRules {
        design: Design::CaseStudy,
        cues: &[
            r"\b(?:case study|case of)\b",
            r"\b(?:this school|our school|in (?:our|this) school)\b",
            r"\b(?:section|class|classroom|advisory|strand)\b",
            r"\b(?:program|programme|project|intervention|initiative|policy)\b",
            r"\b(?:implementation|rollout|pilot)\b",
            r"\b(?:bounded|specific group|small group)\b",
            r"\b(?:one|a single)(?: \w+){0,2} (?:class|section|classroom|school|group)\b",
            r"\b(?:affect|affected|influence|influenced|impact|impacted)\b",
        ],
        strong: &["case study", "this school", "our school", "bounded", "a single"],
        reason: "Naming one specific class, school, or program signals a bounded case (case study).",
        source_hints: &[
            Source::Interview,
            Source::Observation,
            Source::DocumentAnalysis,
            Source::ArtifactAnalysis,
        ],
        rewrites: &[
            "How did {topic} affect participation in one Grade 11 class over two weeks?",
            "How was {topic} implemented in our school this quarter, and what records show its effects on a specific group of learners?",
        ],
    },
    DesignRules {
        design: Design::Ethnography,
        cues: &[
            r"\b(?:culture|cultures|cultural|subculture)\b",
            r"\bnorms?\b",
            r"\b(?:unwritten rules|shared rules|shared norms)\b",
            r"\b(?:traditions?|rituals?|customs?)\b",
            r"\b(?:values|beliefs)\b",
            r"\b(?:group identity|identity)\b",
            r"\b(?:community|club|organization|members)\b",
            r"\b(?:shared practices|common practices|ways of|way of life|shared meanings?)\b",
        ],
        strong: &[
            "unwritten rules",
            "shared norms",
            "subculture",
            "ritual",
            "shared practices",
            "way of life",
        ],
        reason: "Culture, norms, or traditions of a group commonly point to ethnography.",
        source_hints: &[
            Source::Observation,
            Source::Interview,
            Source::ArtifactAnalysis,
            Source::DocumentAnalysis,
        ],
        rewrites: &[
            "What norms and unwritten rules shape {topic} among members of the school journalism club?",
            "What shared practices and traditions surround {topic} within one Grade 11 section this semester?",
        ],
    },
    DesignRules {
        design: Design::GroundedTheory,
        cues: &[
            r"\bgrounded theory\b",
            r"\bprocess(?:es)?\b",
            r"\b(?:stages?|steps?|step by step)\b",
            r"\b(?:develops?|developed|developing|forms?|emerges?|evolves?)\b",
            r"\bhow (?:\w+ ){0,4}(?:happens|unfolds)\b",
            r"\b(?:model|framework|theory)\b",
            r"\b(?:mechanism|pathways?)\b",
            r"\b(?:decision making|how (?:\w+ ){0,3}decides?|how (?:\w+ ){0,3}choose)\b",
        ],
        strong: &["grounded theory", "decision making", "step by step", "unfolds"],
        reason: "If your RQ is about building an explanation of a process, it fits grounded theory.",
        source_hints: &[Source::Interview, Source::FocusGroup, Source::DocumentAnalysis],
        rewrites: &[
            "What process do Grade 11 learners go through with {topic}, and what stages do they describe this semester?",
            "How does {topic} develop step by step within a small peer study group over the quarter?",
        ],
    },
    DesignRules {
        design: Design::NarrativeInquiry,
        cues: &[
            r"\b(?:narratives?|narrate|narrates)\b",
            r"\b(?:story|stories|life story)\b",
            r"\bjourney\b",
            r"\b(?:turning points?|milestones?)\b",
            r"\b(?:over time|through time|across time|over the (?:school year|semester|years?))\b",
            r"\bfrom (?:\w+ ){1,6}to\b",
            r"\b(?:before and after|since)\b",
            r"\b(?:growth|gradually|overcame|overcome)\b",
        ],
        strong: &["narrative", "life story", "turning point", "before and after"],
        reason: "A story or journey over time fits narrative inquiry.",
        source_hints: &[
            Source::Interview,
            Source::DocumentAnalysis,
            Source::ArtifactAnalysis,
        ],
        rewrites: &[
            "What is the story of one learner's journey with {topic} from the first week to the end of the quarter?",
            "How does a student narrate the turning points in their experience of {topic} across the school year?",
        ],
    },
];

/// Rules for one design.
pub fn rules_for(design: Design) -> &'static DesignRules {
    // DESIGN_RULES is indexed in Design::ALL order.
    &DESIGN_RULES[design as usize]
}

/// Question openings that read as too broad on their own.
pub const GENERIC_STEMS: &[&str] = &[
    "what are the challenges",
    "what are the problems",
    "what are the effects",
    "what are the experiences",
    "what is the impact",
    "what is the role",
    "what factors",
    "how does",
    "how do people",
    "why do students",
];

/// Phrases that narrow a question: a bounded setting, a named section or
/// strand, a time marker, or a perspective marker.
pub const QUALIFIER_PATTERNS: &[&str] = &[
    r"\b(?:in|at|within) (?:one|a single|our|this|the) (?:\w+ ){0,3}(?:class|classroom|section|school|club|group|program)\b",
    r"\bgrade \d+\b",
    r"\bsection [a-z0-9]+\b",
    r"\b(?:stem|abm|humss|gas|tvl|ict) strand\b",
    r"\b(?:semester|quarter|school year|academic year|term|week|weeks|month|months)\b",
    r"\b(?:19|20)\d{2}\b",
    r"\b(?:from the perspective of|perspectives? of|as described by|according to|through the eyes of)\b",
];

/// Guidance for using a specific data source with a specific design.
pub fn source_tip(design: Design, source: Source) -> &'static str {
    use Design::*;
    use Source::*;
    match (design, source) {
        (Phenomenology, Interview) => "Use open questions like \"What was that like for you?\" and probe for concrete moments, not opinions.",
        (Phenomenology, FocusGroup) => "Keep groups small and let members compare meanings; follow up privately on sensitive experiences.",
        (Phenomenology, Observation) => "Observation shows behaviour, not meaning; pair it with short interviews so learners can explain their experience.",
        (Phenomenology, DocumentAnalysis) => "Reflection papers or journals can capture experience in learners' own words; get consent before using them.",
        (Phenomenology, ArtifactAnalysis) => "Artifacts only hint at experience; ask learners to talk about what the artifact means to them.",
        (CaseStudy, Interview) => "Interview people inside the case (learners, adviser, coordinator) so you see it from several angles.",
        (CaseStudy, FocusGroup) => "Run the FGD with members of the same bounded group and tie every question to the case.",
        (CaseStudy, Observation) => "Observe the same setting several times and keep dated field notes for the whole case period.",
        (CaseStudy, DocumentAnalysis) => "Collect logs, attendance, or outputs produced within the case period so evidence is verifiable.",
        (CaseStudy, ArtifactAnalysis) => "Gather artifacts made during the program and compare them from start to end of the case.",
        (Ethnography, Interview) => "Ask about routines and \"how things are done here\" rather than personal opinions.",
        (Ethnography, FocusGroup) => "Let members explain shared rules to each other; note where they agree and disagree.",
        (Ethnography, Observation) => "Spend repeated time in the setting and record routines, roles, and language (with consent).",
        (Ethnography, DocumentAnalysis) => "Rules, minutes, or group posts can reveal norms; read them alongside what you observe.",
        (Ethnography, ArtifactAnalysis) => "Symbols, shirts, logos, or shared objects can show what the group values.",
        (GroundedTheory, Interview) => "Ask learners to walk you through each step in order, then compare answers across participants.",
        (GroundedTheory, FocusGroup) => "Use the FGD to test the stages you found in earlier data and refine your categories.",
        (GroundedTheory, Observation) => "Code repeated behaviours from your notes and look for how one step leads to the next.",
        (GroundedTheory, DocumentAnalysis) => "Planners, checklists, or drafts can show steps in the process over time.",
        (GroundedTheory, ArtifactAnalysis) => "Compare artifacts from different stages to see how the process changes the output.",
        (NarrativeInquiry, Interview) => "Ask for the story in order (beginning, turning points, now) and build a timeline with the participant.",
        (NarrativeInquiry, FocusGroup) => "FGDs blur individual stories; keep one storyteller at the centre or switch to interviews.",
        (NarrativeInquiry, Observation) => "Observation captures a moment, not a story; use it to support what the narrator tells you.",
        (NarrativeInquiry, DocumentAnalysis) => "Diaries, letters, or posts written over time help anchor the narrative to dates.",
        (NarrativeInquiry, ArtifactAnalysis) => "Photos or keepsakes can prompt memories of turning points in the story.",
    }
}
