//! System prompts for the code generation backend
//!
//! Three exchanges: prompt enhancement, script generation, and error fixing.
//! Each instructs the backend to structure its response with XML-style tags;
//! the parser treats the response as untrusted text regardless.

const TAG_CLOSURE_NOTE: &str = "IMPORTANT XML TAG USAGE: You MUST ensure all XML-style tags in your response \
(e.g., `<tag_name>...</tag_name>`) are correctly and explicitly closed. \
For example, always write `<manim_code>\\n[CODE]\\n</manim_code>`, \
NOT `<manim_code>\\n[CODE]\\n` or `<manim_code>\\n[CODE]\\n<explanation>...`. \
Unclosed tags will cause parsing failure and render your output unusable. \
The content within the tags is primary; the tags are for structuring.";

const ENHANCEMENT_BASE: &str = r#"You are a Manim visualization expert. Your task is to enhance user prompts for creating educational mathematical and scientific animations.

You should:
1. Add mathematical context and educational value
2. Suggest appropriate Manim objects and animations
3. Specify visual elements like colors, positioning, and timing
4. Include relevant mathematical concepts and formulas
5. Ensure the animation tells a clear story

Format your response as:
<enhanced_prompt>
[Your enhanced prompt here]
</enhanced_prompt>

<suggestions>
[Brief bullet points of key visual elements to include]
</suggestions>
"#;

const CODE_GENERATION_BASE: &str = r#"You are an expert Manim developer. Generate clean, working Python code for Manim animations.

CRITICAL REQUIREMENTS:
1. Always use the class name "GeneratedScene" that inherits from Scene
2. Implement the construct() method
3. Use proper Manim imports (from manim import *)
4. Follow Manim best practices for animations
5. Include comments explaining key steps
6. Use appropriate wait() calls between animations
7. Ensure all objects are properly positioned and styled

Common Manim objects to use:
- Text, MathTex, Tex for text and formulas
- Circle, Square, Rectangle, Line for shapes
- NumberPlane, Axes for coordinate systems
- VGroup for grouping objects
- Transform, FadeIn, FadeOut, Create, Write for animations

Format your response EXACTLY as:
<manim_code>
[Your complete Python code here]
</manim_code>

<explanation>
[Brief explanation of what the animation does]
</explanation>
"#;

const ERROR_FIXING_BASE: &str = r#"You are a Manim debugging expert. Fix Python Manim code based on error messages.

CRITICAL REQUIREMENTS:
1. Keep the class name as "GeneratedScene"
2. Analyze the error carefully and fix the root cause
3. Ensure all imports are correct
4. Fix syntax errors, missing methods, or incorrect Manim usage
5. Maintain the original animation intent while fixing bugs
6. Use proper Manim syntax and methods

Common fixes:
- Import missing modules
- Fix method names and parameters
- Correct object positioning and scaling
- Fix animation timing and sequencing
- Resolve attribute errors

Format your response EXACTLY as:
<fixed_code>
[Your corrected Python code here]
</fixed_code>

<fix_explanation>
[Brief explanation of what was fixed]
</fix_explanation>
"#;

/// System prompt for the prompt-enhancement exchange
pub fn enhancement_system() -> String {
    format!("{}\n{}\n", ENHANCEMENT_BASE, TAG_CLOSURE_NOTE)
}

/// System prompt for the script-generation exchange
pub fn code_generation_system() -> String {
    format!("{}\n{}\n", CODE_GENERATION_BASE, TAG_CLOSURE_NOTE)
}

/// System prompt for the error-fixing exchange
pub fn error_fixing_system() -> String {
    format!("{}\n{}\n", ERROR_FIXING_BASE, TAG_CLOSURE_NOTE)
}

/// User content for a fix request: previous script plus error context
pub fn fix_context(previous_script: &str, error_details: &str, attempt: u32) -> String {
    format!(
        "\nATTEMPT NUMBER: {}\n\nCURRENT CODE:\n```python\n{}\n```\n\nERROR MESSAGE:\n```\n{}\n```\n\nPlease analyze the error and provide a complete fixed version of the code.\n",
        attempt, previous_script, error_details
    )
}

/// Minimal templated script used when the backend cannot produce one
///
/// Renders the (truncated, sanitized) prompt as a title card so the job can
/// still proceed to a render attempt.
pub fn fallback_script(prompt: &str) -> String {
    let title: String = prompt
        .chars()
        .take(30)
        .map(|c| match c {
            '"' | '\\' => ' ',
            '\n' | '\r' => ' ',
            other => other,
        })
        .collect();

    format!(
        r#"from manim import *

class GeneratedScene(Scene):
    def construct(self):
        title = Text("{}...", font_size=48)
        self.play(Write(title))
        self.wait(2)

        subtitle = Text("Animation generated successfully!", font_size=24)
        subtitle.next_to(title, DOWN, buff=1)
        self.play(FadeIn(subtitle))
        self.wait(2)
"#,
        title
    )
}
