//! Fixed prompt templates for the study-aid assistant.
//!
//! The assistant persona, grounding rules, and output formats are part
//! of the product behavior; both templates constrain the model to the
//! retrieved course material and to admitting when the material is not
//! enough.

/// System instruction for RAG question answering.
pub const SYSTEM_PROMPT_CHAT: &str = "\
你是一位大學「考前小救星」助教，專門幫學生複習某一門課（例如離散數學、線性代數、資料結構）。

請根據提供的教材內容回答問題：
- 儘量用台灣大學生習慣的中文說明
- 先給結論，再用步驟或條列式解釋
- 必要時舉 1 個簡單小例子幫助理解
- 如果資料不夠，請老實說「從目前資料看不出來」，不要亂掰。
";

/// System instruction for quiz authoring.
pub const SYSTEM_PROMPT_QUIZ: &str = "\
你是一位大學課程的助教，正在幫學生準備考前小測驗。

請根據提供的「課程教材內容」來命題：
- 題目難度：期中 / 期末考中等難度
- 題型：以簡答題、計算題、證明 / 說明題為主，可以少量選擇題
- 每一題一定要有「題目 (Q)」和「參考解答 (A)」
- 題目一定要可以從提供的內容推得出來，不要胡亂新增沒出現過的理論。
";

/// Retrieval query substituted when the quiz topic is left blank.
pub const DEFAULT_QUIZ_QUERY: &str = "這門課的核心重點與常考觀念";

/// Soft-fail result when quiz retrieval finds nothing.
pub const NO_DATA_SENTINEL: &str = "資料不存在";

/// User message for the question-answering path.
pub fn render_chat_prompt(retrieved_chunks: &str, question: &str) -> String {
    format!(
        "\
以下是這門課（例如：離散、線代、資料結構）的部分教材內容：

{retrieved_chunks}

---

學生的問題是：

{question}

請根據上述「教材內容」來回答，不要使用外部沒出現過的定理。
回答格式建議：
1. 先一句話總結重點
2. 再用條列式說明步驟 / 定義 / 性質
3. 若適用，可以補一個小例子（簡單就好）
"
    )
}

/// User message for the quiz-authoring path.
pub fn render_quiz_prompt(retrieved_chunks: &str, num_questions: u8) -> String {
    format!(
        "\
以下是這門課的教材內容節錄：

{retrieved_chunks}

---

請根據這些內容，設計 {num_questions} 題考前小測驗。
請遵守：
- 題目盡量對應這些內容的重要觀念、定義、定理或典型例題
- 可以混合簡答 / 計算 / 證明 / 選擇題，但要適合考前複習
- 每題都要有參考解答，寫在 A 後面

輸出格式請嚴格使用：

Q1: （題目）
A1: （參考解答）

Q2: （題目）
A2: （參考解答）

...
"
    )
}
