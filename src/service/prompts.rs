//! Prompt text sent to the generative service

use crate::model::Category;
use crate::studio::GenerationMode;

const AVATAR_STYLE_INSTRUCTIONS: &str = "\
Style: 3D Game Character / Snapchat Bitmoji style.
Body: Female mannequin, consistent proportions, standing front-facing.
Vibe: Clean, minimal, studio lighting.
NO: Realism, messy backgrounds, distorted limbs.";

const FLAT_LAY_STYLE_INSTRUCTIONS: &str = "\
Style: High-end fashion magazine lay-flat (2D collage).
Vibe: Realistic textures, clean arrangement, white/neutral background.
Action: Arrange the provided clothing items into a cohesive outfit layout.
NO: Avatars, cartoons, body parts (unless model photo provided).";

pub const AVATAR_FACE_PROMPT: &str = "Generate a cute 3D stylized avatar headshot based on this person's features. Front facing, neutral expression, soft studio lighting, game-character style. White background.";

pub const ISOLATE_PROMPT: &str = "Isolate the clothing item in this photo. Remove the background, people and any other objects completely. Return only the garment, centered on a plain white background, keeping its exact colors, texture and shape.";

pub const IDENTITY_REFERENCE_PROMPT: &str = "Identity reference: use this 3D character face for the avatar. The facial identity must be preserved exactly.";

/// Classification instruction listing the allowed categories
pub fn classify_prompt() -> String {
    let names: Vec<&str> = Category::CLASSIFIABLE.iter().map(|c| c.as_str()).collect();
    format!(
        "Analyze this fashion item. Return a JSON object with 'category' (one of: {}) and a short 10-word 'description' of color/pattern.",
        names.join(", ")
    )
}

/// Caption placed after each garment image
pub fn layer_caption(index: usize, label: &str) -> String {
    format!("Clothing Item {} (Layering order: {}).", index + 1, label)
}

/// Closing task instruction for a compose request
pub fn compose_prompt(mode: GenerationMode) -> String {
    match mode {
        GenerationMode::Avatar => format!(
            "{}\nTask: Create a full-body 3D avatar wearing an outfit inspired by the provided Clothing Items.\n\
Layering: Apply items in the order provided (e.g. Item 1 under Item 2).\n\
If a character face is provided, strictly maintain that facial appearance.\n\
If multiple items are uploaded (e.g. top and bottom), wear them together.\n\
If a moodboard/full outfit photo is provided, separate the items visually on the avatar.",
            AVATAR_STYLE_INSTRUCTIONS
        ),
        GenerationMode::FlatLay => format!(
            "{}\nTask: Create a professional 'Outfit Grid' or 'Lay-flat' photography composition.\n\
Items: Include all the provided clothing items, respecting the layering order given.\n\
Style: Realistic, high resolution, remove backgrounds of individual items and place them on a clean white/grey studio surface.\n\
Arrangement: Neatly folded or laid out as if ready to wear.\n\
Do NOT generate a human or avatar. Just the clothes.",
            FLAT_LAY_STYLE_INSTRUCTIONS
        ),
    }
}
