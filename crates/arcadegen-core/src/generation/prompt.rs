//! Instruction template sent to the remote model.
//!
//! The template is rendered with [`minijinja`]; the user prompt is passed as
//! a value, so template syntax typed by a user is never interpreted.

use minijinja::{Environment, context};

use crate::error::GenerationError;
use crate::executor::DEFAULT_CANVAS_ID;

pub const CANVAS_WIDTH: u32 = 800;
pub const CANVAS_HEIGHT: u32 = 600;

const TEMPLATE_NAME: &str = "game_prompt.txt";

const GAME_PROMPT: &str = r#"You are an expert at writing small games that run on an HTML5 canvas with plain JavaScript.

Game description from the user: "{{ prompt }}"

Generate complete, working game code that satisfies every requirement below.

[Hard constraints]
1. The canvas element id is '{{ canvas_id }}'
2. The canvas size is {{ width }}x{{ height }}px
3. All code must run as a single JavaScript file
4. Keep global variables to a minimum
5. No explanations and no comments outside the code; return code only

[Required features]
- Game loop driven by requestAnimationFrame
- Keyboard controls (arrow keys, WASD, space, ...)
- Collision detection
- Score display
- Game-over detection
- Reset with the R key
- Controls help drawn on screen

[Example game types]
- Dodge: the player avoids obstacles
- Catch: the player catches falling items
- Shooter: the player shoots enemies
- Jumper: the player jumps over obstacles

[Code shape]
```javascript
// Canvas lookup
const canvas = document.getElementById('{{ canvas_id }}');
const ctx = canvas.getContext('2d');

// Game state
let score = 0;
let gameOver = false;

// Player
const player = {
  x: canvas.width / 2,
  y: canvas.height - 60,
  width: 40,
  height: 40,
  speed: 5
};

// ... game logic ...

// Game loop
function gameLoop() {
  if (!gameOver) {
    update();
    draw();
    requestAnimationFrame(gameLoop);
  } else {
    drawGameOver();
  }
}

gameLoop();
```

[Output format]
Return only JavaScript code wrapped in a single ```javascript fenced block.
Do not add explanations or any other markdown.

Generate the game code now."#;

/// Renders the fixed game-generation instruction around a user prompt.
#[derive(Debug)]
pub struct PromptTemplate {
    env: Environment<'static>,
    canvas_id: String,
    width: u32,
    height: u32,
}

impl PromptTemplate {
    pub fn new() -> Self {
        let mut env = Environment::new();
        // The template is a compile-time constant; a syntax error here is a
        // programming bug caught by the unit tests below.
        if let Err(e) = env.add_template(TEMPLATE_NAME, GAME_PROMPT) {
            tracing::error!(error = %e, "built-in prompt template failed to parse");
        }
        Self {
            env,
            canvas_id: DEFAULT_CANVAS_ID.to_owned(),
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
        }
    }

    /// Target a different canvas element id.
    pub fn with_canvas_id(mut self, canvas_id: impl Into<String>) -> Self {
        self.canvas_id = canvas_id.into();
        self
    }

    pub fn canvas_id(&self) -> &str {
        &self.canvas_id
    }

    /// Render the instruction for `user_prompt`. Deterministic for equal input.
    pub fn render(&self, user_prompt: &str) -> Result<String, GenerationError> {
        let tmpl = self.env.get_template(TEMPLATE_NAME)?;
        Ok(tmpl.render(context! {
            prompt => user_prompt,
            canvas_id => self.canvas_id.as_str(),
            width => self.width,
            height => self.height,
        })?)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new()
    }
}
